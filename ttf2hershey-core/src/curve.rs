//! Contour flattening
//!
//! Turns one closed contour of on/off-curve points into a polyline. Runs of
//! off-curve points between two on-curve points are treated as the control
//! polygon of a single Bezier segment of matching order and sampled with
//! de Casteljau's algorithm. Runs longer than `max_handles` off-curve
//! points are emitted as straight edges.

use crate::geometry::{Point, Polyline};
use crate::glyph::ContourPoint;

/// Default limit on consecutive off-curve points evaluated as one segment
pub const DEFAULT_MAX_HANDLES: usize = 5;

/// Evaluate the Bezier curve with control polygon `controls` at `t`.
///
/// Uses repeated linear interpolation, so the order of the curve is
/// `controls.len() - 1`. Returns the origin for an empty polygon.
pub fn bezier_point(controls: &[Point], t: f64) -> Point {
    let mut scratch: Vec<Point> = controls.to_vec();
    let mut n = scratch.len();
    if n == 0 {
        return Point::origin();
    }
    while n > 1 {
        for i in 0..n - 1 {
            scratch[i] = scratch[i].lerp(scratch[i + 1], t);
        }
        n -= 1;
    }
    scratch[0]
}

/// Append `precision * controls.len()` samples at uniformly spaced
/// `t` in `[0, 1)`.
fn flush(controls: &[Point], precision: u32, curve: &mut Polyline) {
    let n = precision as usize * controls.len();
    curve.extend((0..n).map(|j| bezier_point(controls, j as f64 / n as f64)));
}

/// Flatten one closed contour.
///
/// With `precision == 0` the points are returned as-is, on- and off-curve
/// alike. The result is open; the closing edge back to the first point is
/// left to the consumer.
pub fn construct_curve(points: &[ContourPoint], precision: u32, max_handles: usize) -> Polyline {
    if precision == 0 || points.is_empty() {
        return points.iter().map(ContourPoint::to_point).collect();
    }

    let segment_sizes = 2..=max_handles + 2;
    let last = points.len() - 1;
    let mut buffer: Vec<Point> = Vec::with_capacity(max_handles + 2);
    let mut curve = Polyline::new();

    for (i, point) in points.iter().enumerate() {
        let xy = point.to_point();
        buffer.push(xy);

        if point.on_curve {
            if segment_sizes.contains(&buffer.len()) {
                flush(&buffer, precision, &mut curve);
                buffer.clear();
                buffer.push(xy);
            } else {
                curve.append(&mut buffer);
            }
        } else if i == 0 {
            // Close the wraparound: the segment starts at the contour's end
            buffer.insert(0, points[last].to_point());
        } else if i == last {
            buffer.push(points[0].to_point());
            if segment_sizes.contains(&buffer.len()) {
                flush(&buffer, precision, &mut curve);
            } else {
                curve.extend_from_slice(&buffer);
            }
            buffer.clear();
        }
    }

    curve.append(&mut buffer);
    curve
}
