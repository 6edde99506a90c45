use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::LibraryError;

/// Current persisted row schema version. Rows written by this crate carry
/// it; loads reject rows from a newer schema instead of misreading them.
pub const SCHEMA_VERSION: u32 = 1;

fn current_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Canonical persisted representation of one ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitleRow {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
    pub title: String,
    pub author: String,
    pub category: String,
    pub year: i32,
    pub total_copies: u32,
    pub loaned_copy_ids: Vec<u32>,
    pub waiting_list: Vec<String>,
    pub borrow_count: u64,
}

/// Storage collaborator: the catalog replaces its whole in-memory set on
/// `load` and rewrites the whole set on `save`. Implementations choose the
/// format; last writer wins.
pub trait Store {
    fn load(&self) -> Result<Vec<TitleRow>, LibraryError>;
    fn save(&self, rows: &[TitleRow]) -> Result<(), LibraryError>;
}

/// In-memory store. Internally synchronized, so clones share one row set
/// and a handle can be kept around to inspect what was persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<Vec<TitleRow>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Vec<TitleRow>, LibraryError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| LibraryError::Persistence("store lock poisoned during load".to_string()))?;
        Ok(rows.clone())
    }

    fn save(&self, rows: &[TitleRow]) -> Result<(), LibraryError> {
        let mut stored = self
            .rows
            .write()
            .map_err(|_| LibraryError::Persistence("store lock poisoned during save".to_string()))?;
        *stored = rows.to_vec();
        Ok(())
    }
}

/// Whole-file JSON store. A missing file loads as an empty catalog, so a
/// fresh deployment needs no seed file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Vec<TitleRow>, LibraryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LibraryError::Persistence(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        let rows: Vec<TitleRow> = serde_json::from_str(&contents)?;
        Ok(rows)
    }

    fn save(&self, rows: &[TitleRow]) -> Result<(), LibraryError> {
        let encoded = serde_json::to_string_pretty(rows)?;
        fs::write(&self.path, encoded).map_err(|e| {
            LibraryError::Persistence(format!(
                "failed to write {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> TitleRow {
        TitleRow {
            schema_version: SCHEMA_VERSION,
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            category: "Sci-Fi".to_string(),
            year: 1965,
            total_copies: 2,
            loaned_copy_ids: vec![1],
            waiting_list: vec!["u3".to_string()],
            borrow_count: 4,
        }
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());

        store.save(&[sample_row()]).unwrap();
        assert_eq!(store.load().unwrap(), vec![sample_row()]);

        // Clones share the same row set.
        let other = store.clone();
        other.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn json_store_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "circulate-store-{}-{:?}.json",
            std::process::id(),
            std::thread::current().id()
        ));
        let store = JsonFileStore::new(&path);

        store.save(&[sample_row()]).unwrap();
        assert_eq!(store.load().unwrap(), vec![sample_row()]);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let store = JsonFileStore::new("/nonexistent-dir-for-sure/books.json");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn json_store_rejects_garbage() {
        let path = std::env::temp_dir().join(format!(
            "circulate-garbage-{}-{:?}.json",
            std::process::id(),
            std::thread::current().id()
        ));
        fs::write(&path, "not json at all").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.load().unwrap_err();
        assert!(matches!(err, LibraryError::Persistence(_)));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn schema_version_defaults_when_absent() {
        let row: TitleRow = serde_json::from_str(
            r#"{
                "title": "Dune",
                "author": "Frank Herbert",
                "category": "Sci-Fi",
                "year": 1965,
                "total_copies": 1,
                "loaned_copy_ids": [],
                "waiting_list": [],
                "borrow_count": 0
            }"#,
        )
        .unwrap();
        assert_eq!(row.schema_version, SCHEMA_VERSION);
    }
}
