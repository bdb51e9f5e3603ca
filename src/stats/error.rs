//! Stats store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or recording `stats.json`.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the stats file failed.
    #[error("cannot write stats: {0}")]
    Write(#[from] std::io::Error),

    /// The stats could not be encoded.
    #[error("stats could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}
