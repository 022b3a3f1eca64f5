//! Stick-figure pose editor.
//!
//! Lines are stored in normalized coordinates so a pose survives surface
//! resizes and can be exchanged as flat `[x1, y1, x2, y2]` arrays. Pointer
//! input arrives in surface pixels.

mod head;
mod render;
mod templates;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::{ArtifactEditor, EditorError, EditorResult};
use crate::geometry::{CanvasSize, Point};

pub use head::{infer_head, Head, HEAD_MIN_HEIGHT, HEAD_RADIUS_RATIO};
pub use render::{RenderOptions, HANDLE_RADIUS, STROKE_WIDTH};
pub use templates::{PoseTemplate, POSE_TEMPLATES};

const HANDLE_RADIUS_SQ: f64 = HANDLE_RADIUS * HANDLE_RADIUS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub p1: Point,
    pub p2: Point,
}

impl Line {
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    pub const fn from_flat([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self {
            p1: Point::new(x1, y1),
            p2: Point::new(x2, y2),
        }
    }

    pub const fn to_flat(self) -> [f64; 4] {
        [self.p1.x, self.p1.y, self.p2.x, self.p2.y]
    }

    fn endpoint_mut(&mut self, endpoint: Endpoint) -> &mut Point {
        match endpoint {
            Endpoint::P1 => &mut self.p1,
            Endpoint::P2 => &mut self.p2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    P1,
    P2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTarget {
    pub line_index: usize,
    pub endpoint: Endpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceDirection {
    Left,
    #[default]
    Front,
    Right,
    Up,
    Down,
}

impl FaceDirection {
    pub const ALL: [FaceDirection; 5] = [
        Self::Left,
        Self::Up,
        Self::Front,
        Self::Down,
        Self::Right,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Front => "front",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn parse(input: &str) -> EditorResult<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(input.trim()))
            .ok_or_else(|| EditorError::InvalidFaceDirection {
                input: input.to_string(),
            })
    }

    /// Unit vector of the head indicator in surface space; `None` for front.
    pub const fn indicator_vector(self) -> Option<(f64, f64)> {
        match self {
            Self::Left => Some((-1.0, 0.0)),
            Self::Right => Some((1.0, 0.0)),
            Self::Up => Some((0.0, -1.0)),
            Self::Down => Some((0.0, 1.0)),
            Self::Front => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoseEditor {
    size: CanvasSize,
    lines: Vec<Line>,
    drag: Option<DragTarget>,
    hover: Option<Point>,
    face_direction: FaceDirection,
    background: Option<RgbaImage>,
}

impl PoseEditor {
    /// Creates a square editor `width` pixels wide with no background.
    pub fn new(width: u32) -> Self {
        let width = width.max(1);
        Self {
            size: CanvasSize::new(width, width),
            lines: Vec::new(),
            drag: None,
            hover: None,
            face_direction: FaceDirection::default(),
            background: None,
        }
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn face_direction(&self) -> FaceDirection {
        self.face_direction
    }

    pub fn set_face_direction(&mut self, face_direction: FaceDirection) {
        self.face_direction = face_direction;
    }

    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    /// Sets or removes the editing background; the surface follows its aspect ratio.
    pub fn set_background(&mut self, background: Option<RgbaImage>) {
        self.background = background.filter(|image| image.width() > 0 && image.height() > 0);
        self.resize(self.size.width);
    }

    /// Changes the surface width; height follows the background aspect, or stays square.
    pub fn resize(&mut self, width: u32) {
        let width = width.max(1);
        self.size = match &self.background {
            Some(image) => CanvasSize::fit_width(width, image.width(), image.height()),
            None => CanvasSize::new(width, width),
        };
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag_target(&self) -> Option<DragTarget> {
        self.drag
    }

    pub fn hover(&self) -> Option<Point> {
        self.hover
    }

    /// Finds the endpoint handle under `pos`, most recently added line first.
    pub fn hit_test(&self, pos: Point) -> Option<DragTarget> {
        self.lines
            .iter()
            .enumerate()
            .rev()
            .find_map(|(line_index, line)| {
                [(Endpoint::P1, line.p1), (Endpoint::P2, line.p2)]
                    .into_iter()
                    .find(|(_, point)| {
                        point.to_pixel(self.size).distance_sq(pos) < HANDLE_RADIUS_SQ
                    })
                    .map(|(endpoint, _)| DragTarget {
                        line_index,
                        endpoint,
                    })
            })
    }

    /// Starts dragging the endpoint under `pos`, or starts a new line there.
    pub fn pointer_down(&mut self, pos: Point) {
        if !self.size.contains(pos) {
            return;
        }
        if let Some(target) = self.hit_test(pos) {
            tracing::debug!(?target, "pose endpoint drag started");
            self.drag = Some(target);
            return;
        }

        let normalized = pos.to_normalized(self.size);
        self.lines.push(Line::new(normalized, normalized));
        self.drag = Some(DragTarget {
            line_index: self.lines.len() - 1,
            endpoint: Endpoint::P2,
        });
        tracing::debug!(lines = self.lines.len(), "pose line started");
    }

    /// Tracks hover and moves the dragged endpoint; `None` means the pointer left.
    pub fn pointer_move(&mut self, pos: Option<Point>) {
        let pos = pos.filter(|pos| self.size.contains(*pos));
        self.hover = pos;
        let (Some(pos), Some(target)) = (pos, self.drag) else {
            return;
        };
        let normalized = pos.to_normalized(self.size);
        if let Some(line) = self.lines.get_mut(target.line_index) {
            *line.endpoint_mut(target.endpoint) = normalized;
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn set_pose(&mut self, lines: Vec<Line>) {
        self.lines = lines;
        self.drag = None;
    }

    pub fn set_pose_flat(&mut self, lines: &[[f64; 4]]) {
        self.set_pose(lines.iter().copied().map(Line::from_flat).collect());
    }

    pub fn apply_template(&mut self, template: &PoseTemplate) {
        self.set_pose_flat(template.lines);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.drag = None;
    }

    pub fn head(&self) -> Option<Head> {
        infer_head(&self.lines)
    }

    pub fn export_lines(&self) -> Vec<[f64; 4]> {
        self.lines.iter().copied().map(Line::to_flat).collect()
    }
}

impl ArtifactEditor for PoseEditor {
    type Input = [Line];

    fn load(&mut self, input: &[Line]) -> EditorResult<()> {
        self.set_pose(input.to_vec());
        Ok(())
    }

    fn export(&self) -> EditorResult<String> {
        self.export_raster()
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn is_blank(&self) -> bool {
        self.lines.is_empty()
    }
}
