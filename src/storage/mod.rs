//! Storage module for persisting collected records
//!
//! This module handles writing a run's records to a single structured,
//! human-readable document and reading it back.

mod json;
mod traits;

pub use json::JsonFileStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::crawler::Record;
use crate::HarvestError;
use std::path::Path;

/// Saves records to `path` as pretty-printed JSON
///
/// # Arguments
///
/// * `path` - Output file; an existing file is overwritten
/// * `records` - The records to write
///
/// # Returns
///
/// * `Ok(())` - All records were written
/// * `Err(HarvestError::Storage)` - The file could not be created or written
pub fn save(path: &Path, records: &[Record]) -> Result<(), HarvestError> {
    JsonFileStore::new().save(path, records)?;
    Ok(())
}
