//! Persistence: the `.n2i` note format and storage backends.

pub mod format;
mod file;
mod memory;

pub use file::{FileStorage, load_path, save_path};
pub use format::{FILE_EXTENSION, FORMAT_VERSION, NoteRecord};
pub use memory::MemoryStorage;

use crate::document::Document;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Note not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unsupported note format: {0}")]
    Format(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for note storage backends.
///
/// Saving overwrites the whole note; there is no partial-write recovery.
pub trait Storage: Send + Sync {
    /// Save a note.
    fn save(&self, id: &str, document: &Document) -> StorageResult<()>;

    /// Load a note.
    fn load(&self, id: &str) -> StorageResult<Document>;

    /// Delete a note. Deleting a missing note is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all note ids.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a note exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}
