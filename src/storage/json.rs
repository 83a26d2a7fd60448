use crate::crawler::Record;
use crate::storage::traits::{RecordStore, StorageResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Stores records as a pretty-printed JSON array
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStore;

impl JsonFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl RecordStore for JsonFileStore {
    fn save(&self, path: &Path, records: &[Record]) -> StorageResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        tracing::info!("Saved {} records to {}", records.len(), path.display());
        Ok(())
    }

    fn load(&self, path: &Path) -> StorageResult<Vec<Record>> {
        let file = File::open(path)?;
        let records = serde_json::from_reader(BufReader::new(file))?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;
    use tempfile::TempDir;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new(
                "Hello".to_string(),
                "http://example.com/p/1".to_string(),
                "2024-05-01".to_string(),
            ),
            Record::new(
                "Second story".to_string(),
                "http://example.com/p/2".to_string(),
                String::new(),
            ),
        ]
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        let store = JsonFileStore::new();

        store.save(&path, &sample_records()).unwrap();
        let loaded = store.load(&path).unwrap();

        assert_eq!(loaded, sample_records());
    }

    #[test]
    fn test_output_is_pretty_printed_with_named_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");

        JsonFileStore::new()
            .save(&path, &sample_records()[..1])
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.starts_with("[\n"));
        assert!(content.contains("\"title\": \"Hello\""));
        assert!(content.contains("\"url\": \"http://example.com/p/1\""));
        assert!(content.contains("\"date\": \"2024-05-01\""));
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        let store = JsonFileStore::new();

        store.save(&path, &sample_records()).unwrap();
        store.save(&path, &[]).unwrap();

        assert!(store.load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_accepts_link_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"[{"title": "Old", "link": "http://example.com/old", "date": ""}]"#,
        )
        .unwrap();

        let loaded = JsonFileStore::new().load(&path).unwrap();
        assert_eq!(loaded[0].url, "http://example.com/old");
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("news.json");

        let err = JsonFileStore::new()
            .save(&path, &sample_records())
            .unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::new().load(&path).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
