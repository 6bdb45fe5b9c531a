//! File-based storage: one `.n2i` file per note.

use super::format::{self, FILE_EXTENSION};
use super::{Storage, StorageError, StorageResult};
use crate::document::Document;
use std::fs;
use std::path::{Path, PathBuf};

/// Stores notes as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            log::info!("Created note directory {}", base_path.display());
        }
        Ok(Self { base_path })
    }

    /// Storage in the platform data directory, e.g. `~/.local/share/penpage/notes`.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Other("Could not determine home directory".to_string()))?;
        Self::new(base.join("penpage").join("notes"))
    }

    /// Path of the file backing note `id`.
    pub fn note_path(&self, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{safe_id}.{FILE_EXTENSION}"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

/// Write `document` to an arbitrary path.
pub fn save_path(path: &Path, document: &Document) -> StorageResult<()> {
    fs::write(path, format::to_json(document)?)?;
    Ok(())
}

/// Read a note from an arbitrary path.
pub fn load_path(path: &Path) -> StorageResult<Document> {
    if !path.exists() {
        return Err(StorageError::NotFound(path.display().to_string()));
    }
    format::from_json(&fs::read_to_string(path)?)
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &Document) -> StorageResult<()> {
        save_path(&self.note_path(id), document)
    }

    fn load(&self, id: &str) -> StorageResult<Document> {
        let path = self.note_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }
        load_path(&path)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        let path = self.note_path(id);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.base_path)?.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == FILE_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.note_path(id).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageTemplate;
    use crate::geometry::InkPoint;
    use crate::shapes::Stroke;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut doc = Document::a4(PageTemplate::Ruled);
        doc.go_to_page(2);
        doc.add_stroke(Stroke::from_points(vec![InkPoint::new(1.0, 1.0), InkPoint::new(9.0, 9.0)]));

        storage.save("lecture-1", &doc).unwrap();
        assert!(dir.path().join("lecture-1.n2i").exists());
        let loaded = storage.load("lecture-1").unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(matches!(storage.load("nonexistent"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(dir.path().join("stray.txt"), "ignored").unwrap();

        let doc = Document::canvas();
        storage.save("b", &doc).unwrap();
        storage.save("a", &doc).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["a".to_string(), "b".to_string()]);

        storage.delete("a").unwrap();
        assert!(!storage.exists("a").unwrap());
        storage.delete("a").unwrap();
        assert_eq!(storage.list().unwrap().len(), 1);
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let doc = Document::canvas();
        storage.save("maths/week 1:notes", &doc).unwrap();
        assert!(dir.path().join("maths_week_1_notes.n2i").exists());
        assert!(storage.load("maths/week 1:notes").is_ok());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(storage.note_path("broken"), "{\"strokes\": [").unwrap();
        assert!(matches!(storage.load("broken"), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(storage.base_path(), nested.as_path());
    }
}
