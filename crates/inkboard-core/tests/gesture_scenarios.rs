//! End-to-end gesture scenarios driven through the `Whiteboard` facade.

use inkboard_core::{
    InputEvent, Mode, PointerButton, PointerInput, PointerKind, ViewportTransform, Whiteboard,
};
use kurbo::{Point, Size};

fn touch(id: u32, x: f64, y: f64) -> PointerInput {
    PointerInput::new(id, Point::new(x, y)).with_kind(PointerKind::Touch)
}

fn mouse(x: f64, y: f64) -> PointerInput {
    PointerInput::new(1, Point::new(x, y))
}

#[test]
fn test_draw_then_export_frames_stroke() {
    let mut board = Whiteboard::new();
    board.pointer_down(mouse(100.0, 100.0));
    board.pointer_move(mouse(150.0, 100.0));
    board.pointer_up(mouse(150.0, 100.0));

    assert_eq!(board.strokes().len(), 1);
    let stroke = &board.strokes().as_slice()[0];
    assert_eq!(stroke.points(), &[Point::new(100.0, 100.0), Point::new(150.0, 100.0)]);

    let svg = board.save_document().unwrap();
    assert!(svg.contains(r#"viewBox="80 80 90 40""#));
    assert!(svg.contains("M 100 100 L 150 100"));
}

#[test]
fn test_pinch_interrupting_draw_leaves_store_unchanged() {
    let mut board = Whiteboard::new();
    board.pointer_down(touch(1, 10.0, 10.0));
    board.pointer_move(touch(1, 20.0, 10.0));
    board.pointer_move(touch(1, 30.0, 10.0));
    let revision = board.strokes().revision();

    board.pointer_down(touch(2, 200.0, 10.0));
    assert!(board.draft().is_none());
    board.pointer_move(touch(2, 300.0, 10.0));
    board.pointer_up(touch(1, 30.0, 10.0));
    board.pointer_up(touch(2, 300.0, 10.0));

    assert!(board.strokes().is_empty());
    assert_eq!(board.strokes().revision(), revision);
    assert!(board.viewport().scale > 1.0);
}

#[test]
fn test_pinch_keeps_world_point_under_centroid() {
    let mut board = Whiteboard::new();
    board.set_canvas_origin(Point::new(50.0, 20.0));
    board.pointer_down(touch(1, 150.0, 120.0));
    board.pointer_down(touch(2, 250.0, 120.0));
    // Canvas-local centroid (150, 100), world (150, 100) under identity.
    let anchor = Point::new(150.0, 100.0);

    let moves = [(140.0, 95.0, 270.0, 130.0), (100.0, 60.0, 330.0, 200.0), (190.0, 120.0, 210.0, 130.0)];
    for (x1, y1, x2, y2) in moves {
        board.pointer_move(touch(1, x1, y1));
        board.pointer_move(touch(2, x2, y2));
        let centroid_client = Point::new((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        let local = centroid_client - board.canvas_origin().to_vec2();
        let under = board.viewport().screen_to_world(local);
        assert!((under - anchor).hypot() < 1e-9, "anchor drifted to {under:?}");
    }
}

#[test]
fn test_pan_mode_then_draw_mode() {
    let mut board = Whiteboard::new();
    board.set_mode(Mode::Pan);
    board.pointer_down(mouse(0.0, 0.0));
    board.pointer_move(mouse(40.0, 30.0));
    board.pointer_up(mouse(40.0, 30.0));
    assert!(board.strokes().is_empty());

    board.set_mode(Mode::Draw);
    board.pointer_down(mouse(40.0, 30.0));
    board.pointer_up(mouse(40.0, 30.0));
    // The tap lands on the world origin after the pan.
    assert_eq!(board.strokes().as_slice()[0].points(), &[Point::ZERO]);
}

#[test]
fn test_mode_switch_mid_gesture_finishes_gesture() {
    let mut board = Whiteboard::new();
    board.pointer_down(mouse(0.0, 0.0));
    board.pointer_move(mouse(10.0, 0.0));
    board.set_mode(Mode::Erase);
    board.pointer_move(mouse(20.0, 0.0));
    board.pointer_up(mouse(20.0, 0.0));
    assert_eq!(board.strokes().len(), 1);
    assert_eq!(board.strokes().as_slice()[0].points().len(), 3);
}

#[test]
fn test_erase_drag_is_one_batch() {
    let mut board = Whiteboard::new();
    for i in 0..4 {
        let x = 20.0 + 30.0 * f64::from(i);
        board.pointer_down(mouse(x, 0.0));
        board.pointer_move(mouse(x, 100.0));
        board.pointer_up(mouse(x, 100.0));
    }
    assert_eq!(board.strokes().len(), 4);

    board.set_mode(Mode::Erase);
    board.pointer_down(mouse(0.0, 50.0));
    let revision = board.strokes().revision();
    board.pointer_move(mouse(200.0, 50.0));
    assert!(board.strokes().is_empty());
    assert_eq!(board.strokes().revision(), revision + 1);
    board.pointer_up(mouse(200.0, 50.0));
}

#[test]
fn test_erase_brush_follows_zoom() {
    let mut board = Whiteboard::new();
    board.pointer_down(mouse(0.0, 0.0));
    board.pointer_move(mouse(100.0, 0.0));
    board.pointer_up(mouse(100.0, 0.0));

    // Zoom in 4x around the origin: 10px on screen is 2.5 world units.
    board.wheel(Point::ZERO, -(4.0_f64.ln() / 1.0015_f64.ln()));
    assert!((board.viewport().scale - 4.0).abs() < 1e-9);

    board.set_mode(Mode::Erase);
    // 3 world units off the line.
    board.pointer_down(mouse(200.0, 12.0));
    board.pointer_up(mouse(200.0, 12.0));
    assert_eq!(board.strokes().len(), 1);
    // 2 world units off the line.
    board.pointer_down(mouse(200.0, 8.0));
    assert!(board.strokes().is_empty());
}

#[test]
fn test_wheel_clamps_to_limits() {
    let mut board = Whiteboard::new();
    for _ in 0..50 {
        board.wheel(Point::new(10.0, 10.0), -500.0);
    }
    assert!((board.viewport().scale - 20.0).abs() < 1e-12);
    for _ in 0..50 {
        board.wheel(Point::new(10.0, 10.0), 500.0);
    }
    assert!((board.viewport().scale - 0.05).abs() < 1e-12);
    let viewport = board.viewport();
    assert!(viewport.tx.is_finite() && viewport.ty.is_finite());
}

#[test]
fn test_space_pan_from_events() {
    let mut board = Whiteboard::new();
    let events = vec![
        InputEvent::KeyDown { code: "Space".into(), repeat: false },
        InputEvent::KeyDown { code: "Space".into(), repeat: true },
        InputEvent::PointerDown(mouse(10.0, 10.0)),
        InputEvent::PointerMove(mouse(60.0, 10.0)),
        InputEvent::PointerUp(mouse(60.0, 10.0)),
        InputEvent::KeyUp { code: "Space".into() },
    ];
    for event in events {
        board.handle_event(event);
    }
    assert!(board.strokes().is_empty());
    assert!((board.viewport().tx - 50.0).abs() < 1e-12);
}

#[test]
fn test_cancel_mid_draw_then_load_document() {
    let mut board = Whiteboard::new();
    board.on_resize(Size::new(800.0, 600.0));
    board.pointer_down(mouse(0.0, 0.0));
    board.pointer_move(mouse(5.0, 5.0));
    board.load_document(r#"<svg><path d="M 0 0 L 10 0"/></svg>"#).unwrap();
    assert!(board.draft().is_none());
    // The interrupted pointer does not resurrect the draft.
    board.pointer_move(mouse(9.0, 9.0));
    board.pointer_up(mouse(9.0, 9.0));
    assert_eq!(board.strokes().len(), 1);
}

#[test]
fn test_secondary_button_is_inert() {
    let mut board = Whiteboard::new();
    let before = *board.viewport();
    board.pointer_down(mouse(0.0, 0.0).with_button(PointerButton::Secondary));
    board.pointer_move(mouse(50.0, 50.0));
    board.pointer_up(mouse(50.0, 50.0));
    assert!(board.strokes().is_empty());
    assert_eq!(*board.viewport(), before);
    assert_eq!(before, ViewportTransform::new());
}
