//! Single-file goblin persistence.
//!
//! The whole goblin set lives in one JSON document under the per-user data
//! directory. Every write rewrites the file atomically (temp file + rename),
//! so a crash between operations leaves either the old state or the new one,
//! never a torn file. The in-memory map mirrors disk; a failed write rolls
//! the map back so callers never observe phantom records.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use gforge_protocol::GoblinId;
use tracing::warn;

use crate::errors::GforgeError;

use super::types::Goblin;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read goblin store at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write goblin store at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Goblin store at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl GforgeError for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            StoreError::ReadFailed { .. } => "STORE_READ_FAILED",
            StoreError::WriteFailed { .. } => "STORE_WRITE_FAILED",
            StoreError::Corrupt { .. } => "STORE_CORRUPT",
        }
    }
}

/// Durable record of goblins; the authority for the goblin set.
///
/// Writers serialize through the inner lock; readers see a consistent
/// snapshot of the last committed state.
pub struct Store {
    path: PathBuf,
    inner: RwLock<HashMap<GoblinId, Goblin>>,
}

impl Store {
    /// Open (or create) the store at `path`, loading any existing records.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let map = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| StoreError::ReadFailed {
                path: path.clone(),
                source: e,
            })?;
            let goblins: Vec<Goblin> =
                serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            goblins.into_iter().map(|g| (g.id.clone(), g)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            inner: RwLock::new(map),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace a record and write through to disk.
    pub fn upsert(&self, goblin: Goblin) -> Result<(), StoreError> {
        let mut map = self.inner.write().expect("store lock poisoned");
        let previous = map.insert(goblin.id.clone(), goblin.clone());
        if let Err(e) = persist(&self.path, &map) {
            // Roll back so memory keeps mirroring disk.
            match previous {
                Some(prev) => map.insert(goblin.id, prev),
                None => map.remove(&goblin.id),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Remove a record and write through to disk. Returns the removed
    /// goblin, or `None` when the id was unknown.
    pub fn remove(&self, id: &GoblinId) -> Result<Option<Goblin>, StoreError> {
        let mut map = self.inner.write().expect("store lock poisoned");
        let Some(removed) = map.remove(id) else {
            return Ok(None);
        };
        if let Err(e) = persist(&self.path, &map) {
            map.insert(id.clone(), removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    pub fn get(&self, id: &GoblinId) -> Option<Goblin> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .get(id)
            .cloned()
    }

    /// The live goblin (Created/Running/Paused) holding `name`, if any.
    pub fn find_live_by_name(&self, name: &str) -> Option<Goblin> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .values()
            .find(|g| g.is_live() && g.name == name)
            .cloned()
    }

    /// Goblins whose id starts with `prefix`.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Vec<Goblin> {
        self.inner
            .read()
            .expect("store lock poisoned")
            .values()
            .filter(|g| g.id.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// All records, oldest first (name as tie-break for stable output).
    pub fn list(&self) -> Vec<Goblin> {
        let mut goblins: Vec<Goblin> = self
            .inner
            .read()
            .expect("store lock poisoned")
            .values()
            .cloned()
            .collect();
        goblins.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        goblins
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = std::fs::remove_file(temp_file) {
        warn!(
            event = "core.store.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err,
            "Failed to clean up temp file after write error"
        );
    }
}

/// Atomically rewrite the store file from the in-memory map.
fn persist(path: &Path, map: &HashMap<GoblinId, Goblin>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        return Err(StoreError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }

    let mut goblins: Vec<&Goblin> = map.values().collect();
    goblins.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    let json = serde_json::to_string_pretty(&goblins).map_err(|e| StoreError::WriteFailed {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    let temp_file = path.with_extension("json.tmp");
    if let Err(e) = std::fs::write(&temp_file, &json) {
        cleanup_temp_file(&temp_file, &e);
        return Err(StoreError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }
    if let Err(e) = std::fs::rename(&temp_file, path) {
        cleanup_temp_file(&temp_file, &e);
        return Err(StoreError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gforge_protocol::GoblinStatus;

    fn store_in(dir: &Path) -> Store {
        Store::open(dir.join("goblins.json")).unwrap()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_upsert_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let goblin = Goblin::new_for_test("id-1", "coder");

        store.upsert(goblin.clone()).unwrap();
        assert_eq!(store.get(&goblin.id), Some(goblin));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let goblin = Goblin::new_for_test("id-1", "coder");
        {
            let store = store_in(dir.path());
            store.upsert(goblin.clone()).unwrap();
        }

        let reopened = store_in(dir.path());
        assert_eq!(reopened.get(&goblin.id), Some(goblin));
    }

    #[test]
    fn test_remove_returns_record_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let goblin = Goblin::new_for_test("id-1", "coder");
        {
            let store = store_in(dir.path());
            store.upsert(goblin.clone()).unwrap();
            let removed = store.remove(&goblin.id).unwrap();
            assert_eq!(removed, Some(goblin.clone()));
            assert_eq!(store.remove(&goblin.id).unwrap(), None);
        }

        let reopened = store_in(dir.path());
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_find_live_by_name_ignores_dead_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let mut stopped = Goblin::new_for_test("id-1", "coder");
        stopped.status = GoblinStatus::Stopped;
        store.upsert(stopped).unwrap();
        assert!(store.find_live_by_name("coder").is_none());

        let live = Goblin::new_for_test("id-2", "coder");
        store.upsert(live.clone()).unwrap();
        assert_eq!(store.find_live_by_name("coder"), Some(live));
    }

    #[test]
    fn test_find_by_id_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.upsert(Goblin::new_for_test("abc-123", "one")).unwrap();
        store.upsert(Goblin::new_for_test("abd-456", "two")).unwrap();

        assert_eq!(store.find_by_id_prefix("abc").len(), 1);
        assert_eq!(store.find_by_id_prefix("ab").len(), 2);
        assert!(store.find_by_id_prefix("zzz").is_empty());
    }

    #[test]
    fn test_list_is_ordered_by_creation() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let mut older = Goblin::new_for_test("id-1", "older");
        older.created_at = "2026-07-29T10:00:00Z".to_string();
        let newer = Goblin::new_for_test("id-2", "newer");
        store.upsert(newer).unwrap();
        store.upsert(older).unwrap();

        let names: Vec<String> = store.list().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["older".to_string(), "newer".to_string()]);
    }

    #[test]
    fn test_corrupt_file_is_reported_not_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goblins.json");
        std::fs::write(&path, "{ not json ]").unwrap();

        let result = Store::open(path);
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_failed_write_rolls_back_memory() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let goblin = Goblin::new_for_test("id-1", "coder");
        store.upsert(goblin.clone()).unwrap();

        // Replace the store file with a directory so the rename fails.
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        let doomed = Goblin::new_for_test("id-2", "doomed");
        let result = store.upsert(doomed.clone());
        assert!(matches!(result, Err(StoreError::WriteFailed { .. })));
        // The phantom record must not be visible after the failed write.
        assert!(store.get(&doomed.id).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_updates_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut goblin = Goblin::new_for_test("id-1", "coder");
        store.upsert(goblin.clone()).unwrap();

        goblin.status = GoblinStatus::Stopped;
        store.upsert(goblin.clone()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&goblin.id).unwrap().status, GoblinStatus::Stopped);
    }
}
