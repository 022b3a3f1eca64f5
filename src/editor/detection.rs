//! Rasterization of detector bounding boxes.
//!
//! Boxes are normalized `[x_min, y_min, x_max, y_max]` in image space. They
//! become either a black-on-white mask that [`MaskPainter::load_mask`] and
//! [`MaskPainter::load_detections`] accept, or a magenta outline preview
//! drawn over the source image.
//!
//! [`MaskPainter::load_mask`]: super::MaskPainter::load_mask
//! [`MaskPainter::load_detections`]: super::MaskPainter::load_detections

use image::RgbaImage;

use super::mask::{MASKED, UNMASKED};
use crate::canvas::stroke_polyline;
use crate::geometry::{Color, Point};

pub type DetectionBox = [f64; 4];

pub const OUTLINE_COLOR: Color = Color::rgb(255, 0, 255);
const OUTLINE_MIN_WIDTH: f64 = 2.0;
const OUTLINE_WIDTH_RATIO: f64 = 0.005;

/// Pixel rectangle `(x0, y0, x1, y1)`, end-exclusive, of pixels whose centers fall inside the box.
fn pixel_rect(bbox: &DetectionBox, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if bbox.iter().any(|value| !value.is_finite()) {
        return None;
    }
    let [ax, ay, bx, by] = *bbox;
    let w = f64::from(width);
    let h = f64::from(height);
    let to_pixels = |lo: f64, hi: f64, extent: f64, limit: u32| {
        let start = (lo.min(hi) * extent - 0.5).ceil().max(0.0);
        let end = (lo.max(hi) * extent - 0.5).ceil().min(f64::from(limit));
        (start < end).then_some((start as u32, end as u32))
    };
    let (x0, x1) = to_pixels(ax, bx, w, width)?;
    let (y0, y1) = to_pixels(ay, by, h, height)?;
    Some((x0, y0, x1, y1))
}

/// Opaque white mask with each box filled opaque black.
pub fn mask_from_boxes(width: u32, height: u32, boxes: &[DetectionBox]) -> RgbaImage {
    let mut mask = RgbaImage::from_pixel(width, height, UNMASKED);
    for bbox in boxes {
        let Some((x0, y0, x1, y1)) = pixel_rect(bbox, width, height) else {
            continue;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                mask.put_pixel(x, y, MASKED);
            }
        }
    }
    mask
}

/// Outline thickness for a preview: 0.5% of the shorter side, at least 2 px.
pub fn outline_width(width: u32, height: u32) -> f64 {
    (f64::from(width.min(height)) * OUTLINE_WIDTH_RATIO).max(OUTLINE_MIN_WIDTH)
}

/// Copy of `image` with every box outlined in magenta.
pub fn outline_boxes(image: &RgbaImage, boxes: &[DetectionBox]) -> RgbaImage {
    let mut preview = image.clone();
    let (width, height) = image.dimensions();
    let stroke = outline_width(width, height);
    let w = f64::from(width);
    let h = f64::from(height);
    for bbox in boxes {
        if bbox.iter().any(|value| !value.is_finite()) {
            continue;
        }
        let [x_min, y_min, x_max, y_max] = *bbox;
        let corners = [
            Point::new(x_min * w, y_min * h),
            Point::new(x_max * w, y_min * h),
            Point::new(x_max * w, y_max * h),
            Point::new(x_min * w, y_max * h),
            Point::new(x_min * w, y_min * h),
        ];
        stroke_polyline(&mut preview, &corners, stroke, OUTLINE_COLOR);
    }
    tracing::debug!(boxes = boxes.len(), "detection preview drawn");
    preview
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAGENTA: image::Rgba<u8> = image::Rgba([255, 0, 255, 255]);

    #[test]
    fn boxes_fill_black_on_white() {
        let mask = mask_from_boxes(100, 50, &[[0.1, 0.2, 0.3, 0.6]]);
        assert_eq!(*mask.get_pixel(10, 10), MASKED);
        assert_eq!(*mask.get_pixel(29, 29), MASKED);
        assert_eq!(*mask.get_pixel(30, 10), UNMASKED);
        assert_eq!(*mask.get_pixel(10, 30), UNMASKED);
        assert_eq!(*mask.get_pixel(9, 10), UNMASKED);
        assert!(mask.pixels().all(|pixel| *pixel == MASKED || *pixel == UNMASKED));
    }

    #[test]
    fn inverted_and_out_of_range_boxes_are_clamped() {
        let mask = mask_from_boxes(20, 20, &[[0.5, 0.5, -1.0, 0.0], [0.9, 0.9, 2.0, 2.0]]);
        assert_eq!(*mask.get_pixel(0, 0), MASKED);
        assert_eq!(*mask.get_pixel(9, 9), MASKED);
        assert_eq!(*mask.get_pixel(19, 19), MASKED);
        assert_eq!(*mask.get_pixel(14, 5), UNMASKED);
    }

    #[test]
    fn degenerate_boxes_mask_nothing() {
        let mask = mask_from_boxes(
            20,
            20,
            &[[0.5, 0.1, 0.5, 0.9], [f64::NAN, 0.0, 1.0, 1.0]],
        );
        assert!(mask.pixels().all(|pixel| *pixel == UNMASKED));
    }

    #[test]
    fn outline_width_scales_with_short_side() {
        assert_eq!(outline_width(100, 100), 2.0);
        assert_eq!(outline_width(2000, 1000), 5.0);
    }

    #[test]
    fn preview_outlines_box_edges_only() {
        let image = RgbaImage::from_pixel(100, 100, image::Rgba([0, 0, 0, 255]));
        let preview = outline_boxes(&image, &[[0.2, 0.2, 0.8, 0.8]]);
        assert_eq!(*preview.get_pixel(50, 19), MAGENTA);
        assert_eq!(*preview.get_pixel(79, 50), MAGENTA);
        assert_eq!(*preview.get_pixel(50, 50), image::Rgba([0, 0, 0, 255]));
        assert_eq!(*preview.get_pixel(5, 5), image::Rgba([0, 0, 0, 255]));
    }
}
