//! Freehand stroke records.

use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for strokes.
pub type StrokeId = Uuid;

/// Color and width applied to a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// CSS color string, e.g. `#0c62f0`.
    pub color: String,
    /// Line width in world units.
    pub width: f64,
}

impl StrokeStyle {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }

    /// Whether the width is a positive finite number.
    pub fn has_valid_width(&self) -> bool {
        self.width.is_finite() && self.width > 0.0
    }
}

/// A committed freehand stroke.
///
/// Strokes are immutable once built: there is no way to edit the points or
/// style of an existing stroke, only to remove it from the store. There is
/// no `Deserialize`: every stroke goes through [`Stroke::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    id: StrokeId,
    points: Vec<Point>,
    style: StrokeStyle,
}

impl Stroke {
    /// Build a stroke with a fresh id.
    ///
    /// Consecutive repeated points are collapsed, so `[p, p]` becomes the
    /// dot `[p]`. Returns `None` for an empty point list, a non-finite
    /// coordinate, or a non-positive width.
    pub fn new(mut points: Vec<Point>, style: StrokeStyle) -> Option<Self> {
        points.dedup();
        if points.is_empty() || !style.has_valid_width() {
            return None;
        }
        if points.iter().any(|p| !p.is_finite()) {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            points,
            style,
        })
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Points in world coordinates, in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn color(&self) -> &str {
        &self.style.color
    }

    pub fn width(&self) -> f64 {
        self.style.width
    }

    /// A stroke with a single point renders as a dot rather than a line.
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }

    /// Bounding box of the points (width is not included).
    pub fn bounds(&self) -> Rect {
        points_bounds(&self.points).unwrap_or(Rect::ZERO)
    }

    /// The polyline as a path.
    pub fn to_path(&self) -> BezPath {
        polyline_path(&self.points)
    }
}

/// An in-progress stroke that has not been committed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftStroke {
    points: Vec<Point>,
    style: StrokeStyle,
}

impl DraftStroke {
    /// Start a draft at `start` with the style captured at gesture start.
    pub fn new(start: Point, style: StrokeStyle) -> Self {
        Self {
            points: vec![start],
            style,
        }
    }

    /// Append a point, skipping exact repeats of the last point.
    ///
    /// Returns whether the point was added.
    pub fn add_point(&mut self, point: Point) -> bool {
        if !point.is_finite() || self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_path(&self) -> BezPath {
        polyline_path(&self.points)
    }

    /// Turn the draft into an immutable stroke with a fresh id.
    pub fn commit(self) -> Option<Stroke> {
        Stroke::new(self.points, self.style)
    }
}

/// Union bounding box of a point list, or `None` when it is empty.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_points(*first, *first);
    for point in &points[1..] {
        rect = rect.union_pt(*point);
    }
    Some(rect)
}

fn polyline_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for point in rest {
        path.line_to(*point);
    }
    path
}
