//! Canvas editors that build structured inputs for generation requests.

pub mod detection;
pub mod mask;
pub mod outpaint;
pub mod pose;
pub mod scribble;

use crate::canvas::CanvasError;
use thiserror::Error;

pub use detection::{mask_from_boxes, outline_boxes, DetectionBox};
pub use mask::MaskPainter;
pub use outpaint::{Anchor, AspectRatio, Compositor, Placement};
pub use pose::{
    FaceDirection, Head, Line, PoseEditor, PoseTemplate, RenderOptions, POSE_TEMPLATES,
};
pub use scribble::ScribbleEditor;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no image loaded")]
    NoImageLoaded,
    #[error("nothing has been composed yet")]
    NothingComposed,
    #[error("image has zero size: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    #[error("invalid aspect ratio: {input}")]
    InvalidAspectRatio { input: String },
    #[error("invalid anchor: {input}")]
    InvalidAnchor { input: String },
    #[error("invalid face direction: {input}")]
    InvalidFaceDirection { input: String },
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// Uniform handle over an editor that owns a surface and produces an image artifact.
pub trait ArtifactEditor {
    /// What the editor is loaded from: a source image, a pose, or stroke paths.
    type Input: ?Sized;

    fn load(&mut self, input: &Self::Input) -> EditorResult<()>;
    /// Encodes the editor's exportable artifact as a PNG data URL.
    fn export(&self) -> EditorResult<String>;
    /// Discards user edits, keeping any loaded source image.
    fn reset(&mut self);
    /// True when exporting would produce the empty artifact.
    fn is_blank(&self) -> bool;
}
