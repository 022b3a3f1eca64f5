//! Freehand mask painter.
//!
//! Strokes are kept on a translucent overlay above a pristine copy of the
//! loaded image. The exported mask is derived by diffing the composited
//! working raster against the pristine original: any changed pixel is
//! opaque black, everything else opaque white.

use image::{imageops, RgbaImage};

use super::detection::{mask_from_boxes, DetectionBox};
use super::{ArtifactEditor, EditorError, EditorResult};
use crate::canvas::{
    composite_over, decode_data_url, decode_image_bytes, encode_png_data_url, stroke_coverage,
};
use crate::geometry::{CanvasSize, Color, Point};

pub const BRUSH_SIZE_MIN: u32 = 5;
pub const BRUSH_SIZE_MAX: u32 = 80;
pub const BRUSH_SIZE_DEFAULT: u32 = 20;
/// 0.7 of full opacity.
pub const OVERLAY_ALPHA: u8 = 178;
pub const OVERLAY_COLOR: Color = Color::rgba(255, 0, 255, OVERLAY_ALPHA);
/// Channels below this value on all of R, G and B mark a pixel as masked.
pub const MASK_LOAD_THRESHOLD: u8 = 128;

pub(crate) const MASKED: image::Rgba<u8> = image::Rgba([0, 0, 0, 255]);
pub(crate) const UNMASKED: image::Rgba<u8> = image::Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone)]
pub struct MaskPainter {
    layout_width: u32,
    brush_size: u32,
    original: Option<RgbaImage>,
    overlay: RgbaImage,
}

impl MaskPainter {
    pub fn new(layout_width: u32) -> Self {
        Self {
            layout_width: layout_width.max(1),
            brush_size: BRUSH_SIZE_DEFAULT,
            original: None,
            overlay: RgbaImage::new(0, 0),
        }
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, brush_size: u32) {
        self.brush_size = brush_size.clamp(BRUSH_SIZE_MIN, BRUSH_SIZE_MAX);
    }

    pub fn size(&self) -> CanvasSize {
        let (width, height) = self.overlay.dimensions();
        CanvasSize::new(width, height)
    }

    pub fn has_image(&self) -> bool {
        self.original.is_some()
    }

    pub fn original(&self) -> Option<&RgbaImage> {
        self.original.as_ref()
    }

    /// Sets the pristine background, sized to the layout width at the image's aspect.
    pub fn load_image(&mut self, image: &RgbaImage) -> EditorResult<()> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(EditorError::EmptyImage { width, height });
        }
        let size = CanvasSize::fit_width(self.layout_width, width, height);
        let original = if (width, height) == (size.width, size.height) {
            image.clone()
        } else {
            imageops::resize(image, size.width, size.height, imageops::FilterType::Triangle)
        };

        self.overlay = RgbaImage::new(size.width, size.height);
        self.original = Some(original);
        tracing::debug!(
            source_width = width,
            source_height = height,
            width = size.width,
            height = size.height,
            "mask painter image loaded"
        );
        Ok(())
    }

    /// Decodes and loads an encoded image; on failure the painter is left as it was.
    pub fn load_image_bytes(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let image = decode_image_bytes(bytes).inspect_err(|err| {
            tracing::warn!(?err, "failed to decode image for mask painter");
        })?;
        self.load_image(&image)
    }

    /// Reinterprets a black-on-white mask as overlay paint on the current surface.
    pub fn load_mask(&mut self, mask_data_url: &str) -> EditorResult<()> {
        if self.original.is_none() {
            return Err(EditorError::NoImageLoaded);
        }
        let mask = decode_data_url(mask_data_url)?;
        self.apply_mask(&mask);
        Ok(())
    }

    /// Loads normalized detector boxes as overlay paint on the current surface.
    pub fn load_detections(&mut self, boxes: &[DetectionBox]) -> EditorResult<()> {
        if self.original.is_none() {
            return Err(EditorError::NoImageLoaded);
        }
        let (width, height) = self.overlay.dimensions();
        self.apply_mask(&mask_from_boxes(width, height, boxes));
        Ok(())
    }

    fn apply_mask(&mut self, mask: &RgbaImage) {
        let (width, height) = self.overlay.dimensions();
        let resized;
        let mask = if mask.dimensions() == (width, height) {
            mask
        } else {
            resized = imageops::resize(mask, width, height, imageops::FilterType::Triangle);
            &resized
        };

        let mut loaded = 0_usize;
        for (dst, src) in self.overlay.pixels_mut().zip(mask.pixels()) {
            let is_masked = src[0] < MASK_LOAD_THRESHOLD
                && src[1] < MASK_LOAD_THRESHOLD
                && src[2] < MASK_LOAD_THRESHOLD;
            if is_masked {
                *dst = OVERLAY_COLOR.to_rgba();
                loaded += 1;
            }
        }
        tracing::debug!(loaded, "mask loaded into painter overlay");
    }

    /// Strokes `path` (surface pixels) with the overlay color and round caps/joins.
    pub fn paint(&mut self, path: &[Point], brush_size: u32) {
        if self.original.is_none() {
            tracing::debug!("ignoring paint without a loaded image");
            return;
        }
        self.set_brush_size(brush_size);
        let (width, height) = self.overlay.dimensions();
        let overlay = &mut self.overlay;
        stroke_coverage(width, height, path, f64::from(self.brush_size), |x, y, coverage| {
            let alpha = (f64::from(OVERLAY_ALPHA) * coverage).round() as u8;
            let dst = overlay.get_pixel_mut(x, y);
            if alpha > dst[3] {
                *dst = OVERLAY_COLOR.with_alpha(alpha).to_rgba();
            }
        });
    }

    /// Restores the working raster to the pristine background.
    pub fn clear(&mut self) {
        let (width, height) = self.overlay.dimensions();
        self.overlay = RgbaImage::new(width, height);
    }

    /// Original with all strokes composited on top.
    pub fn working(&self) -> EditorResult<RgbaImage> {
        let original = self.original.as_ref().ok_or(EditorError::NoImageLoaded)?;
        Ok(composite_over(original, &self.overlay))
    }

    /// Fraction of surface pixels carrying any overlay paint.
    pub fn overlay_coverage(&self) -> f64 {
        let total = self.overlay.pixels().len();
        if total == 0 {
            return 0.0;
        }
        let painted = self.overlay.pixels().filter(|pixel| pixel[3] > 0).count();
        painted as f64 / total as f64
    }

    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    /// Binary mask: opaque black where the working raster differs from the original.
    pub fn mask_image(&self) -> EditorResult<RgbaImage> {
        let original = self.original.as_ref().ok_or(EditorError::NoImageLoaded)?;
        let working = composite_over(original, &self.overlay);
        let (width, height) = original.dimensions();
        let mut mask = RgbaImage::from_pixel(width, height, UNMASKED);
        for ((dst, before), after) in mask.pixels_mut().zip(original.pixels()).zip(working.pixels())
        {
            if before != after {
                *dst = MASKED;
            }
        }
        Ok(mask)
    }

    pub fn masked_pixel_count(&self) -> usize {
        self.mask_image()
            .map(|mask| mask.pixels().filter(|pixel| **pixel == MASKED).count())
            .unwrap_or(0)
    }

    pub fn export_mask(&self) -> EditorResult<String> {
        let mask = self.mask_image()?;
        Ok(encode_png_data_url(&mask)?)
    }
}

impl ArtifactEditor for MaskPainter {
    type Input = RgbaImage;

    fn load(&mut self, input: &RgbaImage) -> EditorResult<()> {
        self.load_image(input)
    }

    fn export(&self) -> EditorResult<String> {
        self.export_mask()
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn is_blank(&self) -> bool {
        self.masked_pixel_count() == 0
    }
}
