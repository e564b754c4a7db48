//! Ordered collection of committed strokes.

use crate::stroke::{Stroke, StrokeId};
use kurbo::Rect;
use serde::Serialize;
use std::collections::HashSet;

/// The single source of truth for committed strokes, in draw order.
///
/// Every mutation bumps [`revision`](Self::revision) exactly once, so an
/// observer never sees a partially applied batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
    #[serde(skip)]
    revision: u64,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stroke on top of the existing ones.
    pub fn append(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
        self.revision += 1;
    }

    /// Remove every stroke matching the predicate in one mutation.
    ///
    /// Returns the number of removed strokes.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&Stroke) -> bool) -> usize {
        let before = self.strokes.len();
        self.strokes.retain(|stroke| !predicate(stroke));
        let removed = before - self.strokes.len();
        if removed > 0 {
            self.revision += 1;
        }
        removed
    }

    /// Remove a batch of strokes by id.
    pub fn remove_ids(&mut self, ids: &HashSet<StrokeId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.remove_where(|stroke| ids.contains(&stroke.id()))
    }

    /// Replace the whole contents.
    pub fn replace_all(&mut self, strokes: Vec<Stroke>) {
        self.strokes = strokes;
        self.revision += 1;
    }

    /// Remove all strokes.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.revision += 1;
    }

    /// Union bounding box over all stroke points, or `None` when empty.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.strokes
            .iter()
            .map(Stroke::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|stroke| stroke.id() == id)
    }

    /// Strokes in draw order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter()
    }

    pub fn as_slice(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
