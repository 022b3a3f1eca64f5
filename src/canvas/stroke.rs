use image::RgbaImage;

use super::blend_pixel;
use crate::geometry::{Color, Point};

/// Distance from `p` to the segment `a..b`.
#[inline]
fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance_sq(a).sqrt();
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_sq(Point::new(a.x + t * dx, a.y + t * dy)).sqrt()
}

/// One pixel of anti-aliasing ramp around an edge at signed distance `d`.
#[inline]
fn edge_coverage(d: f64) -> f64 {
    (0.5 - d).clamp(0.0, 1.0)
}

/// Pixel rows/columns touched by a shape with the given bounds and padding.
fn pixel_span(min: f64, max: f64, pad: f64, limit: u32) -> Option<(u32, u32)> {
    if limit == 0 {
        return None;
    }
    let lo = (min - pad - 1.0).floor().max(0.0);
    let hi = (max + pad + 1.0).ceil().min(f64::from(limit - 1));
    if lo > hi {
        return None;
    }
    Some((lo as u32, hi as u32))
}

/// Visits every pixel covered by a round-capped, round-joined polyline.
///
/// The path is treated as a single union: overlapping segments report the
/// maximum coverage once per pixel. A single point yields a dot.
///
/// Each segment is rasterized over its own padded bounds into a scratch
/// coverage buffer spanning the path, so cost grows with the area the
/// segments touch rather than with bounds times segment count.
pub fn stroke_coverage(
    width: u32,
    height: u32,
    points: &[Point],
    stroke_width: f64,
    mut visit: impl FnMut(u32, u32, f64),
) {
    let Some(first) = points.first() else {
        return;
    };
    let half = stroke_width / 2.0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }
    let Some((x0, x1)) = pixel_span(min_x, max_x, half, width) else {
        return;
    };
    let Some((y0, y1)) = pixel_span(min_y, max_y, half, height) else {
        return;
    };

    let span_w = (x1 - x0 + 1) as usize;
    let span_h = (y1 - y0 + 1) as usize;
    let mut scratch = vec![0.0_f64; span_w * span_h];

    let mut rasterize = |a: Point, b: Point| {
        let Some((sx0, sx1)) = pixel_span(a.x.min(b.x), a.x.max(b.x), half, width) else {
            return;
        };
        let Some((sy0, sy1)) = pixel_span(a.y.min(b.y), a.y.max(b.y), half, height) else {
            return;
        };
        for y in sy0..=sy1 {
            let row = (y - y0) as usize * span_w;
            for x in sx0..=sx1 {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let coverage = edge_coverage(distance_to_segment(center, a, b) - half);
                let slot = &mut scratch[row + (x - x0) as usize];
                if coverage > *slot {
                    *slot = coverage;
                }
            }
        }
    };

    if points.len() == 1 {
        rasterize(*first, *first);
    } else {
        for pair in points.windows(2) {
            rasterize(pair[0], pair[1]);
        }
    }

    for (index, coverage) in scratch.into_iter().enumerate() {
        if coverage > 0.0 {
            let x = x0 + (index % span_w) as u32;
            let y = y0 + (index / span_w) as u32;
            visit(x, y, coverage);
        }
    }
}

pub fn stroke_polyline(target: &mut RgbaImage, points: &[Point], stroke_width: f64, color: Color) {
    let (width, height) = target.dimensions();
    stroke_coverage(width, height, points, stroke_width, |x, y, coverage| {
        blend_pixel(target.get_pixel_mut(x, y), color, coverage);
    });
}

pub fn stroke_circle(
    target: &mut RgbaImage,
    center: Point,
    radius: f64,
    stroke_width: f64,
    color: Color,
) {
    let (width, height) = target.dimensions();
    let half = stroke_width / 2.0;
    let reach = radius + half;
    let Some((x0, x1)) = pixel_span(center.x, center.x, reach, width) else {
        return;
    };
    let Some((y0, y1)) = pixel_span(center.y, center.y, reach, height) else {
        return;
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            let pixel = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let ring = (pixel.distance_sq(center).sqrt() - radius).abs();
            let coverage = edge_coverage(ring - half);
            if coverage > 0.0 {
                blend_pixel(target.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}

pub fn fill_disc(target: &mut RgbaImage, center: Point, radius: f64, color: Color) {
    let (width, height) = target.dimensions();
    let Some((x0, x1)) = pixel_span(center.x, center.x, radius, width) else {
        return;
    };
    let Some((y0, y1)) = pixel_span(center.y, center.y, radius, height) else {
        return;
    };
    for y in y0..=y1 {
        for x in x0..=x1 {
            let pixel = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let coverage = edge_coverage(pixel.distance_sq(center).sqrt() - radius);
            if coverage > 0.0 {
                blend_pixel(target.get_pixel_mut(x, y), color, coverage);
            }
        }
    }
}
