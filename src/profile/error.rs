//! Profile store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or changing `profiles.json`.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid profile list.
    #[error("invalid profile list in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the profile list failed.
    #[error("cannot write profiles: {0}")]
    Write(#[from] std::io::Error),

    /// The profile list could not be encoded.
    #[error("profiles could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A profile failed validation.
    #[error("invalid profile: {0}")]
    Invalid(String),

    /// No profile has the given id.
    #[error("profile not found: {0}")]
    NotFound(String),
}

impl ProfileError {
    /// Returns true if the file on disk is unusable as a profile list.
    #[must_use]
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
