//! Storage backends for exported SVG documents.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A place to keep SVG documents by id.
///
/// Calls are synchronous; the board runs on a single thread and a save is
/// one whole-document write.
pub trait DocumentStorage: Send + Sync {
    /// Save a document, replacing any previous one with the same id.
    fn save(&self, id: &str, svg: &str) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, id: &str) -> StorageResult<String>;

    /// Delete a document. Deleting a missing id is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document ids.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}

/// File name offered when the user downloads the drawing.
pub fn suggested_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    format!("whiteboard-{millis}.svg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_file_name() {
        let name = suggested_file_name();
        let stamp = name
            .strip_prefix("whiteboard-")
            .and_then(|rest| rest.strip_suffix(".svg"))
            .unwrap();
        assert!(stamp.parse::<u128>().unwrap() > 0);
    }
}
