//! Session store error types.

use thiserror::Error;

/// Errors that can occur while persisting the session record.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the record failed.
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be encoded.
    #[error("session record could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic store failure (used by in-memory stores).
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

impl SessionError {
    /// Returns true if this error came from the filesystem.
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
