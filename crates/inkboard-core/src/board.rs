//! The drawing surface facade.
//!
//! [`Whiteboard`] owns the viewport, the stroke store and the gesture
//! recognizer, and is the only type a host needs to talk to: it feeds raw
//! input in, reads a [`Scene`] out, and loads or saves SVG documents.

use crate::codec::{ImportedStroke, VectorDocumentCodec};
use crate::config::BoardConfig;
use crate::error::BoardResult;
use crate::gesture::{GestureRecognizer, Mode};
use crate::input::{InputEvent, PointerInput};
use crate::scene::{Scene, build_scene};
use crate::storage::DocumentStorage;
use crate::store::StrokeStore;
use crate::stroke::{DraftStroke, Stroke};
use crate::viewport::ViewportTransform;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Pointer cursor the host should show over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorIcon {
    Crosshair,
    Grab,
    Grabbing,
}

/// Interactive drawing surface.
#[derive(Debug, Clone)]
pub struct Whiteboard {
    config: BoardConfig,
    viewport: ViewportTransform,
    store: StrokeStore,
    gestures: GestureRecognizer,
    codec: VectorDocumentCodec,
    /// Client-space position of the canvas' top-left corner.
    canvas_origin: Point,
    viewport_size: Size,
}

impl Default for Whiteboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Whiteboard {
    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            viewport: ViewportTransform::with_limits(config.min_scale, config.max_scale),
            store: StrokeStore::new(),
            gestures: GestureRecognizer::new(&config),
            codec: VectorDocumentCodec::new(&config),
            canvas_origin: Point::ZERO,
            viewport_size: Size::ZERO,
            config,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.gestures.mode()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        log::debug!("Mode set to {mode}");
        self.gestures.set_mode(mode);
    }

    /// Color for strokes started after this call.
    pub fn set_color(&mut self, color: impl Into<String>) -> BoardResult<()> {
        self.gestures.set_color(color)
    }

    /// Width for strokes started after this call.
    pub fn set_stroke_width(&mut self, width: f64) -> BoardResult<()> {
        self.gestures.set_stroke_width(width)
    }

    /// Remove every stroke and reset the view.
    pub fn clear(&mut self) {
        self.gestures.cancel_gesture();
        self.store.clear();
        self.viewport.reset();
        log::info!("Canvas cleared");
    }

    /// Replace the drawing with the strokes of an SVG document and frame them.
    ///
    /// On a parse error nothing changes. Returns the number of strokes loaded.
    pub fn load_document(&mut self, text: &str) -> BoardResult<usize> {
        let imported = match self.codec.import(text) {
            Ok(imported) => imported,
            Err(e) => {
                log::warn!("Rejected document: {e}");
                return Err(e.into());
            }
        };
        let strokes: Vec<Stroke> = imported
            .into_iter()
            .filter_map(ImportedStroke::into_stroke)
            .collect();
        let count = strokes.len();

        self.gestures.cancel_gesture();
        self.store.replace_all(strokes);
        self.viewport.reset();
        self.fit_to_content();
        log::info!("Loaded {count} strokes");
        Ok(count)
    }

    /// Export the drawing as an SVG document.
    pub fn save_document(&self) -> BoardResult<String> {
        let svg = self.codec.export(self.store.as_slice())?;
        log::info!("Exported {} strokes", self.store.len());
        Ok(svg)
    }

    pub fn save_to(&self, storage: &dyn DocumentStorage, id: &str) -> BoardResult<()> {
        let svg = self.save_document()?;
        storage.save(id, &svg)?;
        Ok(())
    }

    pub fn load_from(&mut self, storage: &dyn DocumentStorage, id: &str) -> BoardResult<usize> {
        let svg = storage.load(id)?;
        self.load_document(&svg)
    }

    /// Frame the current strokes in the viewport, or reset to identity when
    /// there is nothing to frame.
    pub fn fit_to_content(&mut self) {
        self.viewport =
            self.codec
                .fit_to_view(self.store.bounding_box(), self.viewport_size, &self.viewport);
    }

    /// Dispatch any input event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown(input) => self.pointer_down(input),
            InputEvent::PointerMove(input) => self.pointer_move(input),
            InputEvent::PointerUp(input) => self.pointer_up(input),
            InputEvent::PointerCancel(input) => self.pointer_cancel(input),
            InputEvent::Wheel { position, delta_y } => self.wheel(position, delta_y),
            InputEvent::KeyDown { code, repeat } => self.on_key_down(&code, repeat),
            InputEvent::KeyUp { code } => self.on_key_up(&code),
            InputEvent::Resize { width, height } => self.on_resize(Size::new(width, height)),
        }
    }

    pub fn pointer_down(&mut self, input: PointerInput) {
        let input = self.localize(input);
        self.gestures
            .pointer_down(input, &mut self.viewport, &mut self.store);
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        let input = self.localize(input);
        self.gestures
            .pointer_move(input, &mut self.viewport, &mut self.store);
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        let input = self.localize(input);
        self.gestures
            .pointer_up(input, &self.viewport, &mut self.store);
    }

    pub fn pointer_cancel(&mut self, input: PointerInput) {
        let input = self.localize(input);
        self.gestures
            .pointer_cancel(input, &self.viewport, &mut self.store);
    }

    /// Wheel zoom at a client-space position.
    pub fn wheel(&mut self, position: Point, delta_y: f64) {
        let local = self.to_local(position);
        self.gestures.wheel(local, delta_y, &mut self.viewport);
    }

    pub fn on_key_down(&mut self, code: &str, repeat: bool) {
        self.gestures.key_down(code, repeat);
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.gestures.key_up(code);
    }

    /// The drawing surface changed size. The view itself is left alone.
    pub fn on_resize(&mut self, size: Size) {
        self.viewport_size = Size::new(size.width.max(0.0), size.height.max(0.0));
    }

    /// The canvas moved within the client area.
    pub fn set_canvas_origin(&mut self, origin: Point) {
        self.canvas_origin = origin;
    }

    pub fn canvas_origin(&self) -> Point {
        self.canvas_origin
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Committed strokes in draw order.
    pub fn strokes(&self) -> &StrokeStore {
        &self.store
    }

    /// The stroke being drawn right now, if any.
    pub fn draft(&self) -> Option<&DraftStroke> {
        self.gestures.draft()
    }

    pub fn viewport(&self) -> &ViewportTransform {
        &self.viewport
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    /// One-line summary of the view, e.g. `scale=1.000 tx=0.0 ty=0.0 | mode=draw`.
    pub fn status(&self) -> String {
        format!(
            "scale={:.3} tx={:.1} ty={:.1} | mode={}",
            self.viewport.scale,
            self.viewport.tx,
            self.viewport.ty,
            self.gestures.mode()
        )
    }

    pub fn cursor(&self) -> CursorIcon {
        if self.gestures.is_panning() {
            CursorIcon::Grabbing
        } else if self.gestures.mode() == Mode::Pan || self.gestures.pan_key_held() {
            CursorIcon::Grab
        } else {
            CursorIcon::Crosshair
        }
    }

    /// Render description of the current frame.
    pub fn scene(&self) -> Scene {
        build_scene(
            &self.store,
            self.gestures.draft(),
            &self.viewport,
            &self.config.background,
        )
    }

    fn to_local(&self, client: Point) -> Point {
        client - self.canvas_origin.to_vec2()
    }

    fn localize(&self, input: PointerInput) -> PointerInput {
        PointerInput {
            position: self.to_local(input.position),
            ..input
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoardError;
    use crate::input::PointerButton;
    use crate::storage::MemoryStorage;

    fn draw(board: &mut Whiteboard, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        board.pointer_down(PointerInput::new(1, Point::new(first.0, first.1)));
        for &(x, y) in rest {
            board.pointer_move(PointerInput::new(1, Point::new(x, y)));
        }
        let last = points.last().unwrap();
        board.pointer_up(PointerInput::new(1, Point::new(last.0, last.1)));
    }

    #[test]
    fn test_status_string() {
        let mut board = Whiteboard::new();
        assert_eq!(board.status(), "scale=1.000 tx=0.0 ty=0.0 | mode=draw");
        board.set_mode(Mode::Erase);
        assert!(board.status().ends_with("mode=erase"));
    }

    #[test]
    fn test_canvas_origin_is_subtracted() {
        let mut board = Whiteboard::new();
        board.set_canvas_origin(Point::new(10.0, 40.0));
        draw(&mut board, &[(110.0, 140.0), (160.0, 140.0)]);
        let stroke = &board.strokes().as_slice()[0];
        assert_eq!(stroke.points(), &[Point::new(100.0, 100.0), Point::new(150.0, 100.0)]);
    }

    #[test]
    fn test_cursor() {
        let mut board = Whiteboard::new();
        assert_eq!(board.cursor(), CursorIcon::Crosshair);
        board.on_key_down("Space", false);
        assert_eq!(board.cursor(), CursorIcon::Grab);
        board.pointer_down(PointerInput::new(1, Point::ZERO));
        assert_eq!(board.cursor(), CursorIcon::Grabbing);
        board.pointer_up(PointerInput::new(1, Point::ZERO));
        board.on_key_up("Space");
        assert_eq!(board.cursor(), CursorIcon::Crosshair);
        board.set_mode(Mode::Pan);
        assert_eq!(board.cursor(), CursorIcon::Grab);
    }

    #[test]
    fn test_clear_resets_view_and_store() {
        let mut board = Whiteboard::new();
        draw(&mut board, &[(0.0, 0.0), (10.0, 10.0)]);
        board.wheel(Point::new(5.0, 5.0), -200.0);
        board.clear();
        assert!(board.strokes().is_empty());
        assert_eq!(*board.viewport(), ViewportTransform::new());
    }

    #[test]
    fn test_save_empty_is_error() {
        let board = Whiteboard::new();
        assert!(matches!(board.save_document(), Err(BoardError::EmptyDocument)));
    }

    #[test]
    fn test_load_failure_keeps_state() {
        let mut board = Whiteboard::new();
        draw(&mut board, &[(0.0, 0.0), (10.0, 10.0)]);
        board.wheel(Point::ZERO, -50.0);
        let viewport = *board.viewport();
        let revision = board.strokes().revision();

        let result = board.load_document("<svg><g></svg>");
        assert!(matches!(result, Err(BoardError::Parse(_))));
        assert_eq!(board.strokes().len(), 1);
        assert_eq!(board.strokes().revision(), revision);
        assert_eq!(*board.viewport(), viewport);
    }

    #[test]
    fn test_load_fits_content() {
        let mut board = Whiteboard::new();
        board.on_resize(Size::new(400.0, 400.0));
        let count = board
            .load_document(r#"<svg><polyline points="0,0 200,0 200,100"/></svg>"#)
            .unwrap();
        assert_eq!(count, 1);
        let viewport = board.viewport();
        assert!((viewport.scale - 1.0).abs() < 1e-12);
        assert!((viewport.tx - 100.0).abs() < 1e-12);
        assert!((viewport.ty - 150.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_empty_document_resets_view() {
        let mut board = Whiteboard::new();
        board.on_resize(Size::new(400.0, 400.0));
        draw(&mut board, &[(0.0, 0.0), (10.0, 10.0)]);
        board.wheel(Point::ZERO, -50.0);
        assert_eq!(board.load_document("<svg/>").unwrap(), 0);
        assert!(board.strokes().is_empty());
        assert_eq!(*board.viewport(), ViewportTransform::new());
    }

    #[test]
    fn test_set_stroke_width_validation() {
        let mut board = Whiteboard::new();
        assert!(matches!(
            board.set_stroke_width(-1.0),
            Err(BoardError::InvalidStrokeWidth(_))
        ));
        board.set_stroke_width(12.0).unwrap();
        board.set_color("#00ff00").unwrap();
        draw(&mut board, &[(0.0, 0.0)]);
        let stroke = &board.strokes().as_slice()[0];
        assert!((stroke.width() - 12.0).abs() < f64::EPSILON);
        assert_eq!(stroke.color(), "#00ff00");
    }

    #[test]
    fn test_handle_event_dispatch() {
        let mut board = Whiteboard::new();
        let events = [
            InputEvent::Resize { width: 800.0, height: 600.0 },
            InputEvent::PointerDown(PointerInput::new(3, Point::new(1.0, 1.0))),
            InputEvent::PointerMove(PointerInput::new(3, Point::new(4.0, 5.0))),
            InputEvent::PointerUp(PointerInput::new(3, Point::new(4.0, 5.0))),
            InputEvent::Wheel { position: Point::new(100.0, 100.0), delta_y: -100.0 },
        ];
        for event in events {
            board.handle_event(event);
        }
        assert_eq!(board.viewport_size(), Size::new(800.0, 600.0));
        assert_eq!(board.strokes().len(), 1);
        assert!(board.viewport().scale > 1.0);
    }

    #[test]
    fn test_draft_visible_in_scene() {
        let mut board = Whiteboard::new();
        board.pointer_down(PointerInput::new(1, Point::new(1.0, 1.0)));
        board.pointer_move(PointerInput::new(1, Point::new(2.0, 2.0)));
        assert_eq!(board.draft().map(DraftStroke::len), Some(2));
        let scene = board.scene();
        assert_eq!(scene.items.len(), 1);
        assert!(scene.items[0].is_draft());
        board.pointer_cancel(PointerInput::new(1, Point::new(2.0, 2.0)));
        assert!(board.scene().items.is_empty());
    }

    #[test]
    fn test_middle_button_pan_from_board() {
        let mut board = Whiteboard::new();
        board.pointer_down(PointerInput::new(1, Point::new(0.0, 0.0)).with_button(PointerButton::Middle));
        board.pointer_move(PointerInput::new(1, Point::new(25.0, -5.0)));
        board.pointer_up(PointerInput::new(1, Point::new(25.0, -5.0)));
        assert!((board.viewport().tx - 25.0).abs() < 1e-12);
        assert!((board.viewport().ty + 5.0).abs() < 1e-12);
        assert!(board.strokes().is_empty());
    }

    #[test]
    fn test_storage_roundtrip() {
        let storage = MemoryStorage::new();
        let mut board = Whiteboard::new();
        draw(&mut board, &[(0.0, 0.0), (30.0, 40.0)]);
        board.save_to(&storage, "sketch").unwrap();

        let mut other = Whiteboard::new();
        assert_eq!(other.load_from(&storage, "sketch").unwrap(), 1);
        assert_eq!(other.strokes().as_slice()[0].points(), board.strokes().as_slice()[0].points());
        assert!(matches!(
            other.load_from(&storage, "missing"),
            Err(BoardError::Storage(_))
        ));
    }
}
