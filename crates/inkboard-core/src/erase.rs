//! Geometric erase hit testing.
//!
//! Hit testing is done purely on stroke geometry, independent of how (or
//! whether) strokes are rendered.

use crate::store::StrokeStore;
use crate::stroke::{Stroke, StrokeId};
use kurbo::{Point, Vec2};

/// Hit tester with a fixed brush radius in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EraseHitTester {
    radius_px: f64,
}

impl EraseHitTester {
    pub fn new(radius_px: f64) -> Self {
        Self { radius_px }
    }

    pub fn radius_px(&self) -> f64 {
        self.radius_px
    }

    /// World-space tolerance for the given viewport scale.
    ///
    /// Dividing by scale keeps the brush the same apparent size on screen at
    /// every zoom level.
    pub fn tolerance(&self, scale: f64) -> f64 {
        self.radius_px / scale
    }

    /// Whether `point` lies strictly within `tolerance` of the stroke.
    pub fn is_hit(point: Point, stroke: &Stroke, tolerance: f64) -> bool {
        match stroke.points() {
            [] => false,
            [only] => (point - *only).hypot() < tolerance,
            points => points
                .windows(2)
                .any(|pair| distance_to_segment(point, pair[0], pair[1]) < tolerance),
        }
    }

    /// Ids of every stroke in the store hit at `point`.
    pub fn hits<'a>(
        store: &'a StrokeStore,
        point: Point,
        tolerance: f64,
    ) -> impl Iterator<Item = StrokeId> + 'a {
        store
            .iter()
            .filter(move |stroke| Self::is_hit(point, stroke, tolerance))
            .map(Stroke::id)
    }
}

/// Euclidean distance from `p` to the segment `a`-`b`.
///
/// The projection parameter is clamped to `[0, 1]`; a zero-length segment
/// degenerates to point distance.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return ap.hypot();
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    (p - projection).hypot()
}

/// Upper bound on the intervals [`sample_segment`] produces for one segment.
pub const MAX_SEGMENT_SAMPLES: usize = 4096;

/// Evenly spaced samples from `a` to `b`, both ends included, at most
/// `step` apart. Very long segments are capped at [`MAX_SEGMENT_SAMPLES`]
/// intervals, so the spacing grows past `step` for them.
pub fn sample_segment(a: Point, b: Point, step: f64) -> Vec<Point> {
    let distance = (b - a).hypot();
    let n = if step > 0.0 && distance.is_finite() {
        ((distance / step).ceil() as usize).clamp(1, MAX_SEGMENT_SAMPLES)
    } else {
        1
    };
    let delta: Vec2 = b - a;
    (0..=n)
        .map(|i| a + delta * (i as f64 / n as f64))
        .collect()
}
