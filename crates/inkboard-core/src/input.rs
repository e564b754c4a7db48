//! Input events fed into the board by the host environment.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer identifier assigned by the host (one per mouse, pen or finger).
pub type PointerId = u32;

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Left mouse button, pen tip or touch contact.
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Pen,
    Touch,
}

/// A pointer sample in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub pointer_id: PointerId,
    /// Position in client coordinates; the board subtracts the canvas origin.
    pub position: Point,
    #[serde(default)]
    pub button: PointerButton,
    #[serde(default)]
    pub kind: PointerKind,
}

impl PointerInput {
    pub fn new(pointer_id: PointerId, position: Point) -> Self {
        Self {
            pointer_id,
            position,
            button: PointerButton::Primary,
            kind: PointerKind::Mouse,
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Every input the board reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown(PointerInput),
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    PointerCancel(PointerInput),
    Wheel {
        position: Point,
        delta_y: f64,
    },
    KeyDown {
        code: String,
        #[serde(default)]
        repeat: bool,
    },
    KeyUp {
        code: String,
    },
    Resize {
        width: f64,
        height: f64,
    },
}
