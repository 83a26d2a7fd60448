//! Storage traits and error types
//!
//! This module defines the trait interface for record stores and the
//! associated error type.

use crate::crawler::Record;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// A store persists a whole run's records as one document. Saving overwrites
/// any existing document at the path; a failed save is not rolled back.
pub trait RecordStore {
    /// Writes all records to `path`, replacing its previous contents
    fn save(&self, path: &Path, records: &[Record]) -> StorageResult<()>;

    /// Reads records previously written with [`RecordStore::save`]
    fn load(&self, path: &Path) -> StorageResult<Vec<Record>>;
}
