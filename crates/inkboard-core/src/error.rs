//! Error types for board operations.

use crate::storage::StorageError;
use thiserror::Error;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors surfaced by the drawing surface.
///
/// None of these are fatal: the in-memory drawing is left intact whenever
/// one of them is returned.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The document handed to `load_document` could not be read.
    #[error("Failed to parse document: {0}")]
    Parse(#[from] ParseError),

    /// Export was requested while the store holds no strokes.
    #[error("Nothing to save")]
    EmptyDocument,

    /// A computed scale or translation was not finite.
    #[error("Invalid transform: scale={scale} tx={tx} ty={ty}")]
    InvalidTransform { scale: f64, tx: f64, ty: f64 },

    /// A stroke width that is not a positive finite number.
    #[error("Invalid stroke width: {0}")]
    InvalidStrokeWidth(f64),

    /// A stroke color that cannot be written to a document, such as `none`.
    #[error("Invalid stroke color: {0:?}")]
    InvalidColor(String),

    /// Writing the exported document failed.
    #[error("Failed to write document: {0}")]
    Export(String),

    /// Storage backend error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors produced while reading a vector document.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The text is not well-formed XML.
    #[error("Malformed XML: {0}")]
    Xml(String),

    /// The document contains no root element.
    #[error("Document has no root element")]
    MissingRoot,

    /// The root element is not `<svg>`.
    #[error("Root element is <{0}>, expected <svg>")]
    NotSvg(String),

    /// A `d` attribute could not be parsed.
    #[error("Invalid path data {data:?}: {reason}")]
    PathData { data: String, reason: String },

    /// A numeric attribute could not be parsed.
    #[error("Invalid number {value:?} in attribute {attribute}")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
    },
}
