//! Gesture recognition over raw pointer, wheel and key input.
//!
//! The recognizer classifies each pointer sequence as a draw, pan, pinch or
//! erase and drives the viewport and the stroke store accordingly. All
//! positions it receives are canvas-local screen points.

use crate::config::BoardConfig;
use crate::erase::{EraseHitTester, sample_segment};
use crate::error::{BoardError, BoardResult};
use crate::input::{PointerButton, PointerId, PointerInput};
use crate::store::StrokeStore;
use crate::stroke::{DraftStroke, StrokeStyle};
use crate::viewport::ViewportTransform;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// What a primary-button drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Draw,
    Pan,
    Erase,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Draw => "draw",
            Mode::Pan => "pan",
            Mode::Erase => "erase",
        })
    }
}

/// Current gesture and the state it owns.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Drawing with one pointer; the draft lives only here until committed.
    Drawing {
        pointer_id: PointerId,
        draft: DraftStroke,
    },
    /// Dragging the world point captured at gesture start.
    Panning {
        pointer_id: PointerId,
        anchor_world: Point,
    },
    /// Two-pointer pan and zoom around the initial centroid.
    Pinching {
        initial_distance: f64,
        initial_scale: f64,
        anchor_world: Point,
    },
    /// Erasing along the governing pointer's path.
    Erasing {
        pointer_id: PointerId,
        previous: Point,
    },
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::Drawing { .. } => "drawing",
            GestureState::Panning { .. } => "panning",
            GestureState::Pinching { .. } => "pinching",
            GestureState::Erasing { .. } => "erasing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// Pressed pointers and their last canvas-local position, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerSet {
    pointers: Vec<(PointerId, Point)>,
}

impl PointerSet {
    /// Insert or update a pointer.
    pub fn insert(&mut self, id: PointerId, position: Point) {
        if !self.update(id, position) {
            self.pointers.push((id, position));
        }
    }

    /// Update a known pointer; returns `false` if it is not pressed.
    pub fn update(&mut self, id: PointerId, position: Point) -> bool {
        match self.pointers.iter_mut().find(|(pid, _)| *pid == id) {
            Some(entry) => {
                entry.1 = position;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: PointerId) -> bool {
        let before = self.pointers.len();
        self.pointers.retain(|(pid, _)| *pid != id);
        self.pointers.len() != before
    }

    pub fn contains(&self, id: PointerId) -> bool {
        self.pointers.iter().any(|(pid, _)| *pid == id)
    }

    pub fn get(&self, id: PointerId) -> Option<Point> {
        self.pointers
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, p)| *p)
    }

    /// Both positions when exactly two pointers are pressed.
    pub fn pair(&self) -> Option<(Point, Point)> {
        match self.pointers.as_slice() {
            [(_, a), (_, b)] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
    }
}

/// State machine turning raw input into draw, pan, pinch and erase gestures.
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    mode: Mode,
    style: StrokeStyle,
    state: GestureState,
    pointers: PointerSet,
    pan_key: String,
    pan_key_held: bool,
    eraser: EraseHitTester,
    erase_step_px: f64,
    wheel_zoom_base: f64,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

impl GestureRecognizer {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            mode: Mode::default(),
            style: StrokeStyle::new(config.default_color.clone(), config.default_stroke_width),
            state: GestureState::Idle,
            pointers: PointerSet::default(),
            pan_key: config.pan_key.clone(),
            pan_key_held: false,
            eraser: EraseHitTester::new(config.erase_radius_px),
            erase_step_px: config.erase_step_px,
            wheel_zoom_base: config.wheel_zoom_base,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Change the mode. A gesture already in progress finishes as it began.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Style for strokes started from now on.
    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Surrounding whitespace is dropped. Empty and `none` are rejected,
    /// since a saved document would read them back as the default color.
    pub fn set_color(&mut self, color: impl Into<String>) -> BoardResult<()> {
        let color = color.into();
        let trimmed = color.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Err(BoardError::InvalidColor(color));
        }
        self.style.color = trimmed.to_string();
        Ok(())
    }

    pub fn set_stroke_width(&mut self, width: f64) -> BoardResult<()> {
        if !(width.is_finite() && width > 0.0) {
            return Err(BoardError::InvalidStrokeWidth(width));
        }
        self.style.width = width;
        Ok(())
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn pointers(&self) -> &PointerSet {
        &self.pointers
    }

    /// The uncommitted stroke of the current draw gesture.
    pub fn draft(&self) -> Option<&DraftStroke> {
        match &self.state {
            GestureState::Drawing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, GestureState::Panning { .. })
    }

    pub fn pan_key_held(&self) -> bool {
        self.pan_key_held
    }

    pub fn eraser(&self) -> &EraseHitTester {
        &self.eraser
    }

    /// Abandon the current gesture without committing anything.
    pub fn cancel_gesture(&mut self) {
        if !self.state.is_idle() {
            log::debug!("Cancelling {} gesture", self.state.name());
        }
        self.state = GestureState::Idle;
    }

    /// Abandon the current gesture and forget all pressed pointers.
    pub fn reset(&mut self) {
        self.cancel_gesture();
        self.pointers.clear();
    }

    pub fn key_down(&mut self, code: &str, repeat: bool) {
        if !repeat && code == self.pan_key {
            self.pan_key_held = true;
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if code == self.pan_key {
            self.pan_key_held = false;
        }
    }

    fn should_pan(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Middle => true,
            PointerButton::Primary => self.pan_key_held || self.mode == Mode::Pan,
            PointerButton::Secondary => false,
        }
    }

    pub fn pointer_down(
        &mut self,
        input: PointerInput,
        viewport: &mut ViewportTransform,
        store: &mut StrokeStore,
    ) {
        let local = input.position;
        self.pointers.insert(input.pointer_id, local);

        if self.pointers.len() == 2 && self.mode != Mode::Erase {
            self.begin_pinch(viewport);
            return;
        }

        if !self.state.is_idle() {
            log::debug!(
                "Ignoring pointer {} during {} gesture",
                input.pointer_id,
                self.state.name()
            );
            return;
        }

        if self.should_pan(input.button) {
            self.state = GestureState::Panning {
                pointer_id: input.pointer_id,
                anchor_world: viewport.screen_to_world(local),
            };
            log::debug!("Pan started by {:?} pointer {}", input.kind, input.pointer_id);
            return;
        }

        if input.button != PointerButton::Primary {
            return;
        }

        match self.mode {
            Mode::Draw => {
                let start = viewport.screen_to_world(local);
                self.state = GestureState::Drawing {
                    pointer_id: input.pointer_id,
                    draft: DraftStroke::new(start, self.style.clone()),
                };
            }
            Mode::Erase => {
                erase_along(&self.eraser, &[local], viewport, store);
                self.state = GestureState::Erasing {
                    pointer_id: input.pointer_id,
                    previous: local,
                };
            }
            Mode::Pan => {}
        }
    }

    pub fn pointer_move(
        &mut self,
        input: PointerInput,
        viewport: &mut ViewportTransform,
        store: &mut StrokeStore,
    ) {
        let local = input.position;
        if !self.pointers.update(input.pointer_id, local) {
            return;
        }

        match &mut self.state {
            GestureState::Idle => {}
            GestureState::Pinching {
                initial_distance,
                initial_scale,
                anchor_world,
            } => {
                let Some((a, b)) = self.pointers.pair() else {
                    return;
                };
                let ratio = if *initial_distance > f64::EPSILON {
                    (a - b).hypot() / *initial_distance
                } else {
                    1.0
                };
                let new_scale = viewport.clamp_scale(*initial_scale * ratio);
                viewport.zoom_at(*anchor_world, a.midpoint(b), new_scale / viewport.scale);
            }
            GestureState::Panning {
                pointer_id,
                anchor_world,
            } if *pointer_id == input.pointer_id => {
                viewport.pin(*anchor_world, local);
            }
            GestureState::Drawing { pointer_id, draft } if *pointer_id == input.pointer_id => {
                draft.add_point(viewport.screen_to_world(local));
            }
            GestureState::Erasing {
                pointer_id,
                previous,
            } if *pointer_id == input.pointer_id => {
                let samples = sample_segment(*previous, local, self.erase_step_px);
                *previous = local;
                erase_along(&self.eraser, &samples, viewport, store);
            }
            _ => {}
        }
    }

    /// The pointer was lifted: a draw gesture commits its draft.
    pub fn pointer_up(
        &mut self,
        input: PointerInput,
        viewport: &ViewportTransform,
        store: &mut StrokeStore,
    ) {
        self.release(input.pointer_id, true, viewport, store);
    }

    /// The host cancelled the pointer: a draw gesture discards its draft.
    pub fn pointer_cancel(
        &mut self,
        input: PointerInput,
        viewport: &ViewportTransform,
        store: &mut StrokeStore,
    ) {
        self.release(input.pointer_id, false, viewport, store);
    }

    /// Zoom around the pointer. Wheel input is always a zoom, whatever the mode.
    pub fn wheel(&mut self, local: Point, delta_y: f64, viewport: &mut ViewportTransform) {
        // Large deltas overflow the power; saturate at the scale limits instead.
        let target = viewport.clamp_scale(viewport.scale * self.wheel_zoom_base.powf(-delta_y));
        let anchor_world = viewport.screen_to_world(local);
        viewport.zoom_at(anchor_world, local, target / viewport.scale);
    }

    fn begin_pinch(&mut self, viewport: &ViewportTransform) {
        let Some((a, b)) = self.pointers.pair() else {
            return;
        };
        if let GestureState::Drawing { draft, .. } = &self.state {
            log::debug!("Second pointer down; discarding draft of {} points", draft.len());
        }
        let centroid = a.midpoint(b);
        self.state = GestureState::Pinching {
            initial_distance: (a - b).hypot(),
            initial_scale: viewport.scale,
            anchor_world: viewport.screen_to_world(centroid),
        };
        log::debug!("Pinch started at {centroid:?}");
    }

    fn release(
        &mut self,
        pointer_id: PointerId,
        commit: bool,
        viewport: &ViewportTransform,
        store: &mut StrokeStore,
    ) {
        let was_tracked = self.pointers.remove(pointer_id);

        // The governing pair changed; re-anchor so the view does not jump.
        if was_tracked
            && self.pointers.len() == 2
            && matches!(self.state, GestureState::Pinching { .. })
        {
            self.begin_pinch(viewport);
            return;
        }

        let ends_gesture = match &self.state {
            GestureState::Idle => false,
            GestureState::Pinching { .. } => self.pointers.len() < 2,
            GestureState::Drawing { pointer_id: id, .. }
            | GestureState::Panning { pointer_id: id, .. }
            | GestureState::Erasing { pointer_id: id, .. } => *id == pointer_id,
        };
        if !ends_gesture {
            return;
        }

        match std::mem::take(&mut self.state) {
            GestureState::Drawing { draft, .. } if commit => {
                if let Some(stroke) = draft.commit() {
                    log::debug!("Committed stroke {} ({} points)", stroke.id(), stroke.points().len());
                    store.append(stroke);
                }
            }
            GestureState::Drawing { draft, .. } => {
                log::debug!("Pointer {pointer_id} cancelled; discarding draft of {} points", draft.len());
            }
            ended => log::debug!("{} gesture ended", ended.name()),
        }
    }
}

/// Hit-test every sample and remove all hit strokes in a single mutation.
fn erase_along(
    eraser: &EraseHitTester,
    samples: &[Point],
    viewport: &ViewportTransform,
    store: &mut StrokeStore,
) -> usize {
    let tolerance = eraser.tolerance(viewport.scale);
    let mut hit = HashSet::new();
    for sample in samples {
        let world = viewport.screen_to_world(*sample);
        hit.extend(EraseHitTester::hits(store, world, tolerance));
    }
    let removed = store.remove_ids(&hit);
    if removed > 0 {
        log::debug!("Erased {removed} strokes");
    }
    removed
}
