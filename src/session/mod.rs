//! Durable storage for the single in-progress session record.
//!
//! A record older than [`STALE_AFTER_SECS`] is treated as nonexistent and is
//! deleted on read. Two stores are provided:
//!
//! - [`JsonSessionStore`]: `state.json` in the data directory
//! - [`MemorySessionStore`]: in-process store for tests and embedding

mod error;
mod file;
mod memory;

pub use error::SessionError;
pub use file::{JsonSessionStore, SESSION_FILE_NAME};
pub(crate) use file::write_atomic;
pub use memory::MemorySessionStore;

use crate::types::SessionSnapshot;

/// Staleness window: 24 hours.
pub const STALE_AFTER_SECS: i64 = 86_400;

/// Durable key-value store for one session record.
pub trait SessionStore: Send + Sync {
    /// Returns the record, or `None` if absent, unreadable or stale.
    ///
    /// A stale record is deleted as a side effect.
    fn load(&self) -> Option<SessionSnapshot>;

    /// Overwrites the record, stamping `saved_at` with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save(&self, snapshot: SessionSnapshot) -> Result<(), SessionError>;

    /// Deletes the record. Safe to call when absent.
    fn clear(&self);
}

/// Current wall-clock time as Unix seconds.
pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Returns true if a record saved at `saved_at` must be discarded at `now`.
///
/// A zero timestamp means the record was never stamped by a store.
pub fn is_stale(saved_at: i64, now: i64) -> bool {
    saved_at == 0 || now - saved_at > STALE_AFTER_SECS
}
