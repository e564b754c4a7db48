//! File-based storage for native platforms.

use super::{DocumentStorage, StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores each document as `<id>.svg` in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory
    /// if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::Io(format!("Failed to create {}: {e}", base_path.display()))
        })?;
        Ok(Self { base_path })
    }

    /// File storage in the platform data directory, e.g.
    /// `~/.local/share/inkboard/documents` on Linux.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("inkboard").join("documents"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn document_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.svg"))
    }
}

impl DocumentStorage for FileStorage {
    fn save(&self, id: &str, svg: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        fs::write(&path, svg)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {e}", path.display())))?;
        log::debug!("Saved {} bytes to {}", svg.len(), path.display());
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<String> {
        let path = self.document_path(id);
        match fs::read_to_string(&path) {
            Ok(svg) => Ok(svg),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(id.to_string())),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(StorageError::Serialization(
                format!("{} is not valid UTF-8", path.display()),
            )),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.document_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(format!(
                "Failed to delete {}: {e}",
                path.display()
            ))),
        }
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {e}")))?;

        let mut ids: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "svg"))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.document_path(id).exists())
    }
}
