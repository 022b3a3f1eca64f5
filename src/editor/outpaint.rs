//! Outpaint pre-processing: letterbox a source image into a target aspect ratio.
//!
//! The source keeps its own aspect ratio and is pinned to one of nine
//! anchors; the rest of the canvas stays fully transparent so the
//! generation step can fill it.

use std::fmt;

use image::{imageops, RgbaImage};

use super::{ArtifactEditor, EditorError, EditorResult};
use crate::canvas::encode_png_data_url;

pub const DEFAULT_MAX_DIMENSION: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const PRESETS: [AspectRatio; 5] = [
        Self::new(16, 9),
        Self::new(4, 3),
        Self::new(1, 1),
        Self::new(3, 4),
        Self::new(9, 16),
    ];

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parses `"W:H"` with both sides non-zero.
    pub fn parse(input: &str) -> EditorResult<Self> {
        let invalid = || EditorError::InvalidAspectRatio {
            input: input.to_string(),
        };
        let (width, height) = input.trim().split_once(':').ok_or_else(invalid)?;
        let width = width.trim().parse::<u32>().map_err(|_| invalid())?;
        let height = height.trim().parse::<u32>().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self::new(width, height))
    }

    pub fn value(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PRESETS[0]
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Start,
    Center,
    End,
}

impl Align {
    fn offset(self, available: f64, placed: f64) -> f64 {
        let offset = match self {
            Self::Start => 0.0,
            Self::Center => (available - placed) / 2.0,
            Self::End => available - placed,
        };
        offset.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    #[default]
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::Center,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::Center => "center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    pub fn parse(input: &str) -> EditorResult<Self> {
        Self::ALL
            .into_iter()
            .find(|anchor| anchor.as_str().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| EditorError::InvalidAnchor {
                input: input.to_string(),
            })
    }

    const fn horizontal(self) -> Align {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => Align::Start,
            Self::TopCenter | Self::Center | Self::BottomCenter => Align::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => Align::End,
        }
    }

    const fn vertical(self) -> Align {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => Align::Start,
            Self::MiddleLeft | Self::Center | Self::MiddleRight => Align::Center,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => Align::End,
        }
    }
}

/// Where the scaled source lands inside the output canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub fn plan(
    source_width: u32,
    source_height: u32,
    ratio: AspectRatio,
    anchor: Anchor,
    max_dimension: u32,
) -> EditorResult<Placement> {
    if source_width == 0 || source_height == 0 {
        return Err(EditorError::EmptyImage {
            width: source_width,
            height: source_height,
        });
    }
    if ratio.width == 0 || ratio.height == 0 {
        return Err(EditorError::InvalidAspectRatio {
            input: ratio.to_string(),
        });
    }

    let source_w = f64::from(source_width);
    let source_h = f64::from(source_height);
    let wide = u64::from(source_width) * u64::from(ratio.height);
    let tall = u64::from(source_height) * u64::from(ratio.width);
    let (box_w, box_h) = if wide > tall {
        (source_w, wide as f64 / f64::from(ratio.width))
    } else {
        (tall as f64 / f64::from(ratio.height), source_h)
    };

    let max = f64::from(max_dimension.max(1));
    let larger = box_w.max(box_h);
    let scaled = |value: f64| {
        if larger > max {
            value * max / larger
        } else {
            value
        }
    };

    let canvas_width = (scaled(box_w) as u32).max(1);
    let canvas_height = (scaled(box_h) as u32).max(1);
    let width = scaled(source_w);
    let height = scaled(source_h);

    Ok(Placement {
        canvas_width,
        canvas_height,
        x: anchor.horizontal().offset(f64::from(canvas_width), width),
        y: anchor.vertical().offset(f64::from(canvas_height), height),
        width,
        height,
    })
}

/// Scales `source` into a transparent canvas of the target ratio at `anchor`.
pub fn compose(
    source: &RgbaImage,
    ratio: AspectRatio,
    anchor: Anchor,
    max_dimension: u32,
) -> EditorResult<RgbaImage> {
    let placement = plan(source.width(), source.height(), ratio, anchor, max_dimension)?;
    let placed_width = (placement.width.round() as u32).clamp(1, placement.canvas_width);
    let placed_height = (placement.height.round() as u32).clamp(1, placement.canvas_height);
    let scaled = if source.dimensions() == (placed_width, placed_height) {
        source.clone()
    } else {
        imageops::resize(
            source,
            placed_width,
            placed_height,
            imageops::FilterType::Triangle,
        )
    };

    let mut canvas = RgbaImage::new(placement.canvas_width, placement.canvas_height);
    imageops::replace(
        &mut canvas,
        &scaled,
        placement.x.round() as i64,
        placement.y.round() as i64,
    );
    tracing::debug!(
        ratio = %ratio,
        anchor = anchor.as_str(),
        canvas_width = placement.canvas_width,
        canvas_height = placement.canvas_height,
        "outpaint canvas composed"
    );
    Ok(canvas)
}

/// Outpaint pre-processing state: the loaded source plus the current ratio and anchor.
///
/// The canvas is always rebuilt from the current settings, so changing the
/// ratio or anchor after loading never leaves a stale artifact behind.
#[derive(Debug, Clone)]
pub struct Compositor {
    max_dimension: u32,
    ratio: AspectRatio,
    anchor: Anchor,
    source: Option<RgbaImage>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION)
    }
}

impl Compositor {
    pub fn new(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            ratio: AspectRatio::default(),
            anchor: Anchor::default(),
            source: None,
        }
    }

    pub fn ratio(&self) -> AspectRatio {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: AspectRatio) {
        self.ratio = ratio;
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_ref()
    }

    /// Keeps `source` and returns its canvas for the current settings.
    pub fn compose(&mut self, source: &RgbaImage) -> EditorResult<RgbaImage> {
        let canvas = compose(source, self.ratio, self.anchor, self.max_dimension)?;
        self.source = Some(source.clone());
        Ok(canvas)
    }

    pub fn compose_data_url(&mut self, source: &RgbaImage) -> EditorResult<String> {
        let canvas = self.compose(source)?;
        Ok(encode_png_data_url(&canvas)?)
    }

    /// Canvas for the loaded source under the current ratio and anchor.
    pub fn canvas(&self) -> EditorResult<RgbaImage> {
        let source = self.source.as_ref().ok_or(EditorError::NothingComposed)?;
        compose(source, self.ratio, self.anchor, self.max_dimension)
    }
}

impl ArtifactEditor for Compositor {
    type Input = RgbaImage;

    fn load(&mut self, input: &RgbaImage) -> EditorResult<()> {
        self.compose(input).map(|_| ())
    }

    fn export(&self) -> EditorResult<String> {
        Ok(encode_png_data_url(&self.canvas()?)?)
    }

    fn reset(&mut self) {
        self.source = None;
    }

    fn is_blank(&self) -> bool {
        self.source.is_none()
    }
}
