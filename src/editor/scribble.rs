//! Freehand sketch pad whose strokes guide image generation.

use image::RgbaImage;

use super::{ArtifactEditor, EditorResult};
use crate::canvas::{composite_over, encode_png_data_url, fill, stroke_coverage};
use crate::geometry::{CanvasSize, Color, Point};

pub const SCRIBBLE_SIZE: u32 = 512;
pub const SCRIBBLE_BRUSH_WIDTH: f64 = 5.0;

const INK: Color = Color::WHITE;
const EXPORT_BACKGROUND: Color = Color::BLACK;

/// White strokes on a transparent layer, exported flattened onto black.
#[derive(Debug, Clone)]
pub struct ScribbleEditor {
    layer: RgbaImage,
    active: Option<Point>,
}

impl Default for ScribbleEditor {
    fn default() -> Self {
        Self::new(SCRIBBLE_SIZE)
    }
}

impl ScribbleEditor {
    pub fn new(size: u32) -> Self {
        Self {
            layer: RgbaImage::new(size, size),
            active: None,
        }
    }

    pub fn size(&self) -> CanvasSize {
        let (width, height) = self.layer.dimensions();
        CanvasSize::new(width, height)
    }

    pub fn layer(&self) -> &RgbaImage {
        &self.layer
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Strokes `path` (surface pixels) with round caps and joins.
    pub fn paint(&mut self, path: &[Point]) {
        let (width, height) = self.layer.dimensions();
        let layer = &mut self.layer;
        stroke_coverage(width, height, path, SCRIBBLE_BRUSH_WIDTH, |x, y, coverage| {
            let alpha = (coverage * 255.0).round() as u8;
            let dst = layer.get_pixel_mut(x, y);
            if alpha > dst[3] {
                *dst = INK.with_alpha(alpha).to_rgba();
            }
        });
    }

    pub fn pointer_down(&mut self, pos: Point) {
        self.active = Some(pos);
    }

    /// Extends the current stroke to `pos`; ignored when no stroke is active.
    pub fn pointer_move(&mut self, pos: Point) {
        let Some(last) = self.active else {
            return;
        };
        self.paint(&[last, pos]);
        self.active = Some(pos);
    }

    pub fn pointer_up(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!("scribble stroke finished");
        }
    }

    pub fn clear(&mut self) {
        let (width, height) = self.layer.dimensions();
        self.layer = RgbaImage::new(width, height);
        self.active = None;
    }

    pub fn export_image(&self) -> RgbaImage {
        let (width, height) = self.layer.dimensions();
        let mut background = RgbaImage::new(width, height);
        fill(&mut background, EXPORT_BACKGROUND);
        composite_over(&background, &self.layer)
    }

    pub fn export_raster(&self) -> EditorResult<String> {
        Ok(encode_png_data_url(&self.export_image())?)
    }
}

impl ArtifactEditor for ScribbleEditor {
    /// Stroke paths in surface pixels.
    type Input = [Vec<Point>];

    fn load(&mut self, input: &[Vec<Point>]) -> EditorResult<()> {
        self.clear();
        for path in input {
            self.paint(path);
        }
        Ok(())
    }

    fn export(&self) -> EditorResult<String> {
        self.export_raster()
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn is_blank(&self) -> bool {
        self.layer.pixels().all(|pixel| pixel[3] == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::decode_data_url;

    const WHITE: image::Rgba<u8> = image::Rgba([255, 255, 255, 255]);
    const BLACK: image::Rgba<u8> = image::Rgba([0, 0, 0, 255]);

    #[test]
    fn blank_pad_exports_solid_black() {
        let editor = ScribbleEditor::new(32);
        assert!(editor.is_blank());
        let image = editor.export_image();
        assert!(image.pixels().all(|pixel| *pixel == BLACK));
    }

    #[test]
    fn pointer_strokes_export_white_on_black() {
        let mut editor = ScribbleEditor::new(64);
        editor.pointer_down(Point::new(10.0, 32.0));
        editor.pointer_move(Point::new(30.0, 32.0));
        editor.pointer_move(Point::new(50.0, 32.0));
        editor.pointer_up();

        assert!(!editor.is_drawing());
        assert!(!editor.is_blank());
        let image = editor.export_image();
        assert_eq!(*image.get_pixel(40, 31), WHITE);
        assert_eq!(*image.get_pixel(40, 10), BLACK);
        assert!(image.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn move_without_press_draws_nothing() {
        let mut editor = ScribbleEditor::new(32);
        editor.pointer_move(Point::new(5.0, 5.0));
        editor.pointer_move(Point::new(25.0, 25.0));
        assert!(editor.is_blank());
    }

    #[test]
    fn clear_restores_blank_pad() {
        let mut editor = ScribbleEditor::new(32);
        editor.paint(&[Point::new(4.0, 4.0), Point::new(28.0, 28.0)]);
        editor.pointer_down(Point::new(1.0, 1.0));
        editor.clear();
        editor.clear();

        assert!(editor.is_blank());
        assert!(!editor.is_drawing());
        assert!(editor.export_image().pixels().all(|pixel| *pixel == BLACK));
    }

    #[test]
    fn load_replaces_previous_strokes() {
        let mut editor = ScribbleEditor::new(32);
        editor.paint(&[Point::new(2.0, 2.0)]);
        editor
            .load(&[vec![Point::new(16.0, 4.0), Point::new(16.0, 28.0)]])
            .expect("load");

        let image = editor.export_image();
        assert_eq!(*image.get_pixel(2, 2), BLACK);
        assert_eq!(*image.get_pixel(15, 16), WHITE);
    }

    #[test]
    fn export_data_url_decodes_at_pad_size() {
        let url = ScribbleEditor::default().export().expect("export");
        assert_eq!(decode_data_url(&url).expect("decode").dimensions(), (512, 512));
    }
}
