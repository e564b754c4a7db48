//! In-memory storage implementation.

use super::{DocumentStorage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl DocumentStorage for MemoryStorage {
    fn save(&self, id: &str, svg: &str) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.insert(id.to_string(), svg.to_string());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<String> {
        let docs = self.documents.read().map_err(lock_error)?;
        docs.get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let mut docs = self.documents.write().map_err(lock_error)?;
        docs.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self.documents.read().map_err(lock_error)?;
        let mut ids: Vec<String> = docs.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<svg/>";

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        storage.save("test", DOC).unwrap();
        assert_eq!(storage.load("test").unwrap(), DOC);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = storage.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists("test").unwrap());
        storage.save("test", DOC).unwrap();
        assert!(storage.exists("test").unwrap());
        storage.delete("test").unwrap();
        assert!(!storage.exists("test").unwrap());
        storage.delete("test").unwrap();
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        storage.save("doc2", DOC).unwrap();
        storage.save("doc1", DOC).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["doc1".to_string(), "doc2".to_string()]);
    }
}
