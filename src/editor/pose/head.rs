use super::Line;
use crate::geometry::Point;

/// Poses shorter than this (normalized) have no head.
pub const HEAD_MIN_HEIGHT: f64 = 0.01;
pub const HEAD_RADIUS_RATIO: f64 = 0.15;

/// Head circle in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Head {
    pub center: Point,
    pub radius: f64,
}

/// Places a head circle hanging below the topmost endpoint, sized from the
/// pose's vertical extent. Never cached: callers recompute it from the
/// current lines on every render.
pub fn infer_head(lines: &[Line]) -> Option<Head> {
    let mut points = lines.iter().flat_map(|line| [line.p1, line.p2]);
    let first = points.next()?;
    let (top, bottom) = points.fold((first, first), |(top, bottom), point| {
        (
            if point.y < top.y { point } else { top },
            if point.y > bottom.y { point } else { bottom },
        )
    });

    let height = bottom.y - top.y;
    if height.is_nan() || height <= HEAD_MIN_HEIGHT {
        return None;
    }
    let radius = height * HEAD_RADIUS_RATIO;
    Some(Head {
        center: Point::new(top.x, top.y + radius),
        radius,
    })
}
