//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult, format};
use crate::document::Document;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Notes are kept in their serialized form, so loading goes through the
/// same decoder as a file.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    notes: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &Document) -> StorageResult<()> {
        let json = format::to_json(document)?;
        self.notes.write().map_err(lock_error)?.insert(id.to_string(), json);
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<Document> {
        let notes = self.notes.read().map_err(lock_error)?;
        let json = notes.get(id).ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        format::from_json(json)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        self.notes.write().map_err(lock_error)?.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let notes = self.notes.read().map_err(lock_error)?;
        let mut ids: Vec<String> = notes.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.notes.read().map_err(lock_error)?.contains_key(id))
    }
}
