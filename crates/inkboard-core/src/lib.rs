//! Inkboard Core Library
//!
//! Headless engine for an infinite-canvas freehand whiteboard: viewport
//! transform, gesture recognition, stroke storage, erase hit testing and
//! SVG import/export.

pub mod board;
pub mod codec;
pub mod color;
pub mod config;
pub mod erase;
pub mod error;
pub mod gesture;
pub mod input;
pub mod scene;
pub mod storage;
pub mod store;
pub mod stroke;
pub mod viewport;

pub use board::{CursorIcon, Whiteboard};
pub use codec::{ImportedStroke, VectorDocumentCodec};
pub use config::{BoardConfig, ConfigError};
pub use erase::EraseHitTester;
pub use error::{BoardError, BoardResult, ParseError};
pub use gesture::{GestureRecognizer, GestureState, Mode};
pub use input::{InputEvent, PointerButton, PointerId, PointerInput, PointerKind};
pub use scene::{RenderItem, RenderShape, Scene};
pub use storage::{DocumentStorage, MemoryStorage, StorageError};
pub use store::StrokeStore;
pub use stroke::{DraftStroke, Stroke, StrokeId, StrokeStyle};
pub use viewport::ViewportTransform;
