//! Viewport transform between canvas-local screen space and world space.

use crate::config::{MAX_SCALE, MIN_SCALE};
use crate::error::{BoardError, BoardResult};
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Maps world coordinates onto the canvas: `screen = (tx, ty) + scale * world`.
///
/// Screen points handed to this type are canvas-local, i.e. relative to the
/// drawing surface's top-left corner. The scale always stays within
/// `[min_scale, max_scale]`; the translation is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    /// Current zoom factor.
    pub scale: f64,
    /// Horizontal translation in screen pixels.
    pub tx: f64,
    /// Vertical translation in screen pixels.
    pub ty: f64,
    /// Minimum allowed scale.
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    /// Maximum allowed scale.
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
}

fn default_min_scale() -> f64 {
    MIN_SCALE
}

fn default_max_scale() -> f64 {
    MAX_SCALE
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            tx: 0.0,
            ty: 0.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl ViewportTransform {
    /// Create an identity transform with the default scale limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identity transform with custom scale limits.
    pub fn with_limits(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Clamp a scale into the allowed range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// The translation as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.tx, self.ty)
    }

    /// World-to-screen affine, for renderers.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.scale)
    }

    /// Screen-to-world affine.
    pub fn inverse_affine(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset())
    }

    /// Convert a canvas-local screen point to world coordinates.
    pub fn screen_to_world(&self, local: Point) -> Point {
        Point::new((local.x - self.tx) / self.scale, (local.y - self.ty) / self.scale)
    }

    /// Convert a world point to canvas-local screen coordinates.
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(self.tx + self.scale * world.x, self.ty + self.scale * world.y)
    }

    /// Zoom by `factor` so that `anchor_world` lands on `anchor_local`.
    ///
    /// This is the only zoom primitive; wheel and pinch both go through it.
    /// The translation is always recomputed, even when the scale is pinned
    /// at a limit, so a pinch keeps tracking its centroid.
    pub fn zoom_at(&mut self, anchor_world: Point, anchor_local: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring zoom with invalid factor {factor}");
            return;
        }
        let new_scale = self.clamp_scale(self.scale * factor);
        self.scale = new_scale;
        self.pin(anchor_world, anchor_local);
    }

    /// Translate so that `world` maps exactly onto `local` at the current scale.
    pub fn pin(&mut self, world: Point, local: Point) {
        self.tx = local.x - self.scale * world.x;
        self.ty = local.y - self.scale * world.y;
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.tx += delta.x;
        self.ty += delta.y;
    }

    /// Reset to the identity transform, keeping the scale limits.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.tx = 0.0;
        self.ty = 0.0;
    }

    /// Check that scale and translation are finite and the scale is in range.
    pub fn validated(self) -> BoardResult<Self> {
        let in_range = self.scale >= self.min_scale && self.scale <= self.max_scale;
        if self.scale.is_finite() && self.tx.is_finite() && self.ty.is_finite() && in_range {
            Ok(self)
        } else {
            Err(BoardError::InvalidTransform {
                scale: self.scale,
                tx: self.tx,
                ty: self.ty,
            })
        }
    }

    /// Replace this transform with `candidate`, or reset to identity if the
    /// candidate is unusable.
    pub fn apply_or_reset(&mut self, candidate: Self) {
        match candidate.validated() {
            Ok(valid) => *self = valid,
            Err(e) => {
                log::warn!("{e}; resetting viewport");
                self.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_default_viewport() {
        let viewport = ViewportTransform::new();
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_screen_to_world_with_offset_and_scale() {
        let viewport = ViewportTransform {
            scale: 2.0,
            tx: 50.0,
            ty: 100.0,
            ..Default::default()
        };
        let world = viewport.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < EPS);
        assert!((world.y - 100.0).abs() < EPS);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let viewport = ViewportTransform {
            scale: 1.5,
            tx: 30.0,
            ty: -20.0,
            ..Default::default()
        };
        let original = Point::new(123.0, 456.0);
        let back = viewport.world_to_screen(viewport.screen_to_world(original));
        assert!((back.x - original.x).abs() < EPS);
        assert!((back.y - original.y).abs() < EPS);
    }

    #[test]
    fn test_affine_matches_point_conversion() {
        let viewport = ViewportTransform {
            scale: 0.25,
            tx: -7.0,
            ty: 12.0,
            ..Default::default()
        };
        let world = Point::new(40.0, -8.0);
        let a = viewport.to_affine() * world;
        let b = viewport.world_to_screen(world);
        assert!((a - b).hypot() < EPS);
        let back = viewport.inverse_affine() * a;
        assert!((back - world).hypot() < EPS);
    }

    #[test]
    fn test_zoom_at_keeps_anchor() {
        let mut viewport = ViewportTransform {
            scale: 1.3,
            tx: 17.0,
            ty: -4.0,
            ..Default::default()
        };
        let local = Point::new(240.0, 180.0);
        let world = viewport.screen_to_world(local);
        for factor in [1.1, 0.5, 3.0, 0.97] {
            viewport.zoom_at(world, local, factor);
            let after = viewport.screen_to_world(local);
            assert!((after - world).hypot() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = ViewportTransform::new();
        for _ in 0..20 {
            viewport.zoom_at(Point::ZERO, Point::ZERO, 0.3);
            assert!(viewport.scale >= viewport.min_scale && viewport.scale <= viewport.max_scale);
        }
        assert!((viewport.scale - MIN_SCALE).abs() < f64::EPSILON);

        for _ in 0..20 {
            viewport.zoom_at(Point::ZERO, Point::ZERO, 4.0);
            assert!(viewport.scale >= viewport.min_scale && viewport.scale <= viewport.max_scale);
        }
        assert!((viewport.scale - MAX_SCALE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_clamped_still_tracks_anchor_screen() {
        let mut viewport = ViewportTransform::new();
        viewport.zoom_at(Point::new(10.0, 10.0), Point::new(300.0, 200.0), 1000.0);
        let screen = viewport.world_to_screen(Point::new(10.0, 10.0));
        assert!((screen.x - 300.0).abs() < EPS);
        assert!((screen.y - 200.0).abs() < EPS);
    }

    #[test]
    fn test_zoom_ignores_invalid_factor() {
        let mut viewport = ViewportTransform::new();
        viewport.zoom_at(Point::ZERO, Point::new(5.0, 5.0), f64::NAN);
        viewport.zoom_at(Point::ZERO, Point::new(5.0, 5.0), 0.0);
        viewport.zoom_at(Point::ZERO, Point::new(5.0, 5.0), f64::INFINITY);
        assert_eq!(viewport, ViewportTransform::new());
    }

    #[test]
    fn test_pan_and_inverse() {
        let mut viewport = ViewportTransform {
            scale: 2.0,
            tx: 3.5,
            ty: -1.25,
            ..Default::default()
        };
        let delta = Vec2::new(10.3, -20.7);
        viewport.pan(delta);
        assert!((viewport.tx - 13.8).abs() < EPS);
        viewport.pan(-delta);
        assert!((viewport.tx - 3.5).abs() < EPS);
        assert!((viewport.ty + 1.25).abs() < EPS);
        assert!((viewport.scale - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let mut viewport = ViewportTransform::with_limits(0.5, 4.0);
        viewport.zoom_at(Point::ZERO, Point::new(10.0, 10.0), 3.0);
        viewport.reset();
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(viewport.offset(), Vec2::ZERO);
        assert!((viewport.max_scale - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_or_reset_rejects_non_finite() {
        let mut viewport = ViewportTransform {
            scale: 2.0,
            tx: 10.0,
            ty: 10.0,
            ..Default::default()
        };
        let candidate = ViewportTransform {
            tx: f64::NAN,
            ..viewport
        };
        assert!(matches!(candidate.validated(), Err(BoardError::InvalidTransform { .. })));
        viewport.apply_or_reset(candidate);
        assert_eq!(viewport, ViewportTransform::new());
    }
}
