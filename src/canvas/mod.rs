//! Raster plumbing shared by the editors: data URLs, fills, blending and stroke coverage.

mod data_url;
mod stroke;

use image::{ImageError, RgbaImage};
use thiserror::Error;

use crate::geometry::Color;

pub use data_url::{decode_data_url, decode_image_bytes, encode_png_data_url, DataUrl};
pub use stroke::{fill_disc, stroke_circle, stroke_coverage, stroke_polyline};

pub const MIME_IMAGE_PNG: &str = "image/png";

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("malformed data url: {message}")]
    MalformedDataUrl { message: String },
    #[error("data url payload is not valid base64: {source}")]
    InvalidBase64 {
        #[source]
        source: base64::DecodeError,
    },
    #[error("failed to decode image: {source}")]
    Decode {
        #[source]
        source: ImageError,
    },
    #[error("failed to encode png: {source}")]
    Encode {
        #[source]
        source: ImageError,
    },
}

pub type CanvasResult<T> = std::result::Result<T, CanvasError>;

pub fn fill(target: &mut RgbaImage, color: Color) {
    let pixel = color.to_rgba();
    for dst in target.pixels_mut() {
        *dst = pixel;
    }
}

/// Source-over blend of `color` scaled by `coverage` onto one pixel.
pub fn blend_pixel(dst: &mut image::Rgba<u8>, color: Color, coverage: f64) {
    let src_a = f64::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
    if src_a <= 0.0 {
        return;
    }
    let dst_a = f64::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = image::Rgba([0, 0, 0, 0]);
        return;
    }

    let channel = |src: u8, dst: u8| -> u8 {
        let value =
            (f64::from(src) * src_a + f64::from(dst) * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    *dst = image::Rgba([
        channel(color.r, dst[0]),
        channel(color.g, dst[1]),
        channel(color.b, dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]);
}

/// Source-over composite of a whole layer of identical size.
pub fn composite_over(base: &RgbaImage, layer: &RgbaImage) -> RgbaImage {
    let mut out = base.clone();
    for (dst, src) in out.pixels_mut().zip(layer.pixels()) {
        let color = Color::rgba(src[0], src[1], src[2], src[3]);
        blend_pixel(dst, color, 1.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_full_coverage_opaque_color_replaces_pixel() {
        let mut pixel = image::Rgba([10, 20, 30, 255]);
        blend_pixel(&mut pixel, Color::rgb(200, 100, 50), 1.0);
        assert_eq!(pixel, image::Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn blend_zero_coverage_leaves_pixel_untouched() {
        let mut pixel = image::Rgba([10, 20, 30, 255]);
        blend_pixel(&mut pixel, Color::rgb(200, 100, 50), 0.0);
        assert_eq!(pixel, image::Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn blend_translucent_over_transparent_keeps_source_color() {
        let mut pixel = image::Rgba([0, 0, 0, 0]);
        blend_pixel(&mut pixel, Color::rgba(255, 0, 255, 178), 1.0);
        assert_eq!(pixel, image::Rgba([255, 0, 255, 178]));
    }

    #[test]
    fn composite_over_with_transparent_layer_is_identity() {
        let base = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        let layer = RgbaImage::new(3, 2);
        assert_eq!(composite_over(&base, &layer), base);
    }
}
