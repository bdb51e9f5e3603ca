//! In-memory session store.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::error::SessionError;
use super::{is_stale, now_unix, SessionStore};
use crate::types::SessionSnapshot;

/// Session store that keeps the record in memory.
///
/// Applies the same staleness rule as the file store. Saves can be made to
/// fail on demand to exercise best-effort autosave.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<SessionSnapshot>>,
    should_fail: AtomicBool,
    save_count: AtomicUsize,
    clear_count: AtomicUsize,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `snapshot` as-is, without stamping `saved_at`.
    pub fn insert_raw(&self, snapshot: SessionSnapshot) {
        *self.record.lock().unwrap() = Some(snapshot);
    }

    /// Returns the stored record without applying staleness.
    #[must_use]
    pub fn peek(&self) -> Option<SessionSnapshot> {
        self.record.lock().unwrap().clone()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<SessionSnapshot> {
        let mut record = self.record.lock().unwrap();
        match record.as_ref() {
            Some(snapshot) if is_stale(snapshot.saved_at, now_unix()) => {
                *record = None;
                None
            }
            other => other.cloned(),
        }
    }

    fn save(&self, mut snapshot: SessionSnapshot) -> Result<(), SessionError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SessionError::Unavailable("mock failure".to_string()));
        }
        snapshot.saved_at = now_unix();
        *self.record.lock().unwrap() = Some(snapshot);
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) {
        *self.record.lock().unwrap() = None;
        self.clear_count.fetch_add(1, Ordering::SeqCst);
    }
}
