pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod logging;
pub mod storage;
pub use config::CanvasConfig;
pub use error::{AppError, AppResult};

/// Editors for one session, built from the user's `config.json`.
#[derive(Debug)]
pub struct Workspace {
    pub config: CanvasConfig,
    pub mask: editor::MaskPainter,
    pub pose: editor::PoseEditor,
    pub outpaint: editor::Compositor,
    pub scribble: editor::ScribbleEditor,
}

impl Workspace {
    pub fn from_config(config: CanvasConfig) -> Self {
        Self {
            mask: config.mask_painter(),
            pose: config.pose_editor(),
            outpaint: config.compositor(),
            scribble: config.scribble_editor(),
            config,
        }
    }
}

/// Entrypoint used by higher-level integrations and CLI bindings.
pub fn run() -> AppResult<Workspace> {
    logging::init();
    tracing::info!("starting ge-canvas");

    let workspace = Workspace::from_config(config::load_canvas_config());

    tracing::info!(config = ?workspace.config, "workspace ready");
    Ok(workspace)
}
