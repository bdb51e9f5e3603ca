//! JSON file-backed session store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use super::error::SessionError;
use super::{is_stale, now_unix, SessionStore};
use crate::types::SessionSnapshot;

/// File name of the session record inside the data directory.
pub const SESSION_FILE_NAME: &str = "state.json";

/// Stores the session record as pretty-printed JSON.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated record behind.
#[derive(Debug)]
pub struct JsonSessionStore {
    path: PathBuf,
    io: Mutex<()>,
}

impl JsonSessionStore {
    /// Creates a store that keeps its record under `data_dir`.
    ///
    /// The directory is created on first save.
    pub fn new(data_dir: &Path) -> Self {
        Self::at_path(data_dir.join(SESSION_FILE_NAME))
    }

    /// Creates a store backed by an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io: Mutex::new(()),
        }
    }

    /// Returns the record path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove_file(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed session file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove session file {}: {}", self.path.display(), e),
        }
    }
}

/// Writes `data` to a temporary sibling of `path` and renames it into place,
/// creating the parent directory first.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Option<SessionSnapshot> {
        let _guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);

        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        let snapshot: SessionSnapshot = match serde_json::from_slice(&data) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring malformed session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        if is_stale(snapshot.saved_at, now_unix()) {
            debug!("Discarding stale session saved at {}", snapshot.saved_at);
            self.remove_file();
            return None;
        }

        Some(snapshot)
    }

    fn save(&self, mut snapshot: SessionSnapshot) -> Result<(), SessionError> {
        let _guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);

        snapshot.saved_at = now_unix();
        let data = serde_json::to_vec_pretty(&snapshot)?;

        write_atomic(&self.path, &data)?;

        debug!(
            "Saved session {} ({}s of {}s left)",
            snapshot.profile_id, snapshot.remaining_sec, snapshot.total_sec
        );
        Ok(())
    }

    fn clear(&self) {
        let _guard = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        self.remove_file();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::STALE_AFTER_SECS;

    fn store() -> (tempfile::TempDir, JsonSessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(dir.path());
        (dir, store)
    }

    fn write_raw(store: &JsonSessionStore, snapshot: &SessionSnapshot) {
        fs::write(store.path(), serde_json::to_vec(snapshot).unwrap()).unwrap();
    }

    #[test]
    fn test_load_absent_returns_none() {
        let (_dir, store) = store();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = store();
        store.save(SessionSnapshot::new("writing", 1500, 1200)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.profile_id, "writing");
        assert_eq!(loaded.total_sec, 1500);
        assert_eq!(loaded.remaining_sec, 1200);
        assert!((now_unix() - loaded.saved_at).abs() <= 5);
    }

    #[test]
    fn test_save_overwrites_single_record() {
        let (_dir, store) = store();
        store.save(SessionSnapshot::new("a", 60, 50)).unwrap();
        store.save(SessionSnapshot::new("b", 90, 10)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.profile_id, "b");
        assert_eq!(loaded.remaining_sec, 10);
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSessionStore::new(&dir.path().join("nested").join("FocusPlay"));

        store.save(SessionSnapshot::new("p", 60, 60)).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_stale_record_is_discarded_and_deleted() {
        let (_dir, store) = store();
        let mut snapshot = SessionSnapshot::new("old", 1500, 900);
        snapshot.saved_at = now_unix() - STALE_AFTER_SECS - 10;
        write_raw(&store, &snapshot);

        assert!(store.load().is_none());
        assert!(!store.path().exists());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_unstamped_record_is_discarded() {
        let (_dir, store) = store();
        write_raw(&store, &SessionSnapshot::new("p", 60, 30));

        assert!(store.load().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_malformed_record_returns_none() {
        let (_dir, store) = store();
        fs::write(store.path(), b"{not json").unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_removes_record() {
        let (_dir, store) = store();
        store.save(SessionSnapshot::new("p", 60, 30)).unwrap();

        store.clear();
        assert!(!store.path().exists());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_when_absent_is_noop() {
        let (_dir, store) = store();
        store.clear();
        store.clear();
    }

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("stats.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_layout_is_camel_case() {
        let (_dir, store) = store();
        store.save(SessionSnapshot::new("p", 60, 30)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["profileId"], "p");
        assert_eq!(raw["totalSec"], 60);
        assert_eq!(raw["remainingSec"], 30);
        assert!(raw["savedAt"].is_i64());
    }
}
