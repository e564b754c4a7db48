//! Render primitives handed to the presentation layer.
//!
//! The engine does not rasterize anything itself. A frame is described as a
//! [`Scene`]: the world-to-screen transform plus one item per stroke, ready to
//! be fed to any kurbo/peniko based renderer.

use crate::color::parse_css_color;
use crate::store::StrokeStore;
use crate::stroke::{DraftStroke, StrokeId, StrokeStyle};
use crate::viewport::ViewportTransform;
use kurbo::{Affine, BezPath, Cap, Circle, Join, Point, Stroke};
use peniko::Color;

/// Geometry of a render item, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderShape {
    /// Stroked polyline.
    Polyline(BezPath),
    /// Filled circle for a single-point stroke.
    Dot(Circle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    /// `None` for the in-progress draft.
    pub id: Option<StrokeId>,
    pub shape: RenderShape,
    pub color: Color,
    /// Stroke parameters for [`RenderShape::Polyline`]; round caps and joins.
    pub stroke: Stroke,
}

impl RenderItem {
    fn from_points(
        id: Option<StrokeId>,
        points: &[Point],
        style: &StrokeStyle,
        path: BezPath,
    ) -> Self {
        let shape = match points {
            [only] => RenderShape::Dot(Circle::new(*only, style.width / 2.0)),
            _ => RenderShape::Polyline(path),
        };
        Self {
            id,
            shape,
            color: parse_css_color(&style.color),
            stroke: Stroke::new(style.width)
                .with_caps(Cap::Round)
                .with_join(Join::Round),
        }
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_none()
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// World-to-screen transform for every item.
    pub transform: Affine,
    pub background: Color,
    /// Committed strokes in draw order, then the draft.
    pub items: Vec<RenderItem>,
}

/// Build the scene for the current state. The draft, if any, is drawn last
/// so it sits on top of every committed stroke.
pub fn build_scene(
    store: &StrokeStore,
    draft: Option<&DraftStroke>,
    viewport: &ViewportTransform,
    background: &str,
) -> Scene {
    let mut items: Vec<RenderItem> = store
        .iter()
        .map(|stroke| {
            RenderItem::from_points(
                Some(stroke.id()),
                stroke.points(),
                stroke.style(),
                stroke.to_path(),
            )
        })
        .collect();
    if let Some(draft) = draft.filter(|draft| !draft.is_empty()) {
        items.push(RenderItem::from_points(
            None,
            draft.points(),
            draft.style(),
            draft.to_path(),
        ));
    }
    Scene {
        transform: viewport.to_affine(),
        background: parse_css_color(background),
        items,
    }
}
