use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::editor::mask::BRUSH_SIZE_DEFAULT;
use crate::editor::outpaint::DEFAULT_MAX_DIMENSION;
use crate::editor::scribble::SCRIBBLE_SIZE;
use crate::editor::{Compositor, MaskPainter, PoseEditor, ScribbleEditor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "ge-canvas";
const APP_CONFIG_FILE: &str = "config.json";

const DEFAULT_MASK_LAYOUT_WIDTH: u32 = 512;
const DEFAULT_POSE_CANVAS_WIDTH: u32 = 512;

/// Editor settings from `config.json`. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub mask_layout_width: u32,
    pub default_brush_size: u32,
    pub outpaint_max_dimension: u32,
    pub pose_canvas_width: u32,
    pub scribble_size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            mask_layout_width: DEFAULT_MASK_LAYOUT_WIDTH,
            default_brush_size: BRUSH_SIZE_DEFAULT,
            outpaint_max_dimension: DEFAULT_MAX_DIMENSION,
            pose_canvas_width: DEFAULT_POSE_CANVAS_WIDTH,
            scribble_size: SCRIBBLE_SIZE,
        }
    }
}

impl CanvasConfig {
    pub fn mask_painter(&self) -> MaskPainter {
        let mut painter = MaskPainter::new(self.mask_layout_width);
        painter.set_brush_size(self.default_brush_size);
        painter
    }

    pub fn pose_editor(&self) -> PoseEditor {
        PoseEditor::new(self.pose_canvas_width)
    }

    pub fn compositor(&self) -> Compositor {
        Compositor::new(self.outpaint_max_dimension)
    }

    pub fn scribble_editor(&self) -> ScribbleEditor {
        ScribbleEditor::new(self.scribble_size)
    }
}

pub fn load_canvas_config() -> CanvasConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_canvas_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_canvas_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> CanvasConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return CanvasConfig::default(),
    };
    if !path.exists() {
        return CanvasConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => parse_canvas_config(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            CanvasConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            CanvasConfig::default()
        }
    }
}

fn parse_canvas_config(contents: &str) -> serde_json::Result<CanvasConfig> {
    serde_json::from_str(contents)
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
