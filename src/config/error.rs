//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading `config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No data directory was given and none could be derived.
    #[error("no cache directory available; pass --data-dir")]
    NoDataDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_path() {
        let source = serde_json::from_str::<u32>("x").unwrap_err();
        let err = ConfigError::Parse {
            path: PathBuf::from("/tmp/config.json"),
            source,
        };
        assert!(err.to_string().contains("/tmp/config.json"));

        assert!(ConfigError::NoDataDir.to_string().contains("--data-dir"));
    }
}
