/// Shared geometric and color primitives used across canvas and editor modules.
use serde::{Deserialize, Serialize};

/// A 2D coordinate, either normalized to `[0, 1]` or in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scales a normalized point into pixel space of `size`.
    pub fn to_pixel(self, size: CanvasSize) -> Self {
        Self {
            x: self.x * f64::from(size.width),
            y: self.y * f64::from(size.height),
        }
    }

    /// Scales a pixel point into normalized space of `size`.
    pub fn to_normalized(self, size: CanvasSize) -> Self {
        if size.is_empty() {
            return Self::new(0.0, 0.0);
        }
        Self {
            x: self.x / f64::from(size.width),
            y: self.y / f64::from(size.height),
        }
    }

    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(self, point: Point) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x <= f64::from(self.width)
            && point.y <= f64::from(self.height)
    }

    /// Height of a surface `width` wide that keeps the `source` aspect ratio.
    pub fn fit_width(width: u32, source_width: u32, source_height: u32) -> Self {
        if source_width == 0 {
            return Self::new(width, 0);
        }
        let height = u64::from(width) * u64::from(source_height) / u64::from(source_width);
        Self::new(width, u32::try_from(height).unwrap_or(u32::MAX).max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}
