//! User configuration and data directory resolution.
//!
//! Everything FocusPlay persists lives in one data directory:
//!
//! ```text
//! <data-dir>/
//! ├── config.json   (optional, user-edited)
//! ├── profiles.json (see [`crate::profile`])
//! ├── stats.json    (see [`crate::stats`])
//! └── state.json    (session record, see [`crate::session`])
//! ```

mod error;

pub use error::ConfigError;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// File name of the user configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Directory created under the platform cache directory.
pub const APP_DIR_NAME: &str = "FocusPlay";

fn default_volume() -> i32 {
    70
}

fn default_auto_start_audio() -> bool {
    true
}

fn default_autosave_interval_secs() -> u64 {
    60
}

/// Settings read from `config.json`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Volume (0–100) used when `--volume` is not given.
    #[serde(default = "default_volume")]
    pub default_volume: i32,

    /// Whether a profile's music starts together with the timer. An explicit
    /// `--music` plays regardless.
    #[serde(default = "default_auto_start_audio")]
    pub auto_start_audio: bool,

    /// Seconds between session autosaves.
    #[serde(default = "default_autosave_interval_secs")]
    pub autosave_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            auto_start_audio: default_auto_start_audio(),
            autosave_interval_secs: default_autosave_interval_secs(),
        }
    }
}

impl Config {
    /// Loads `config.json` from `data_dir`, falling back to defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Autosave cadence, never shorter than one second.
    #[must_use]
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }
}

/// Resolves the data directory: the explicit override, else
/// `<cache dir>/FocusPlay`.
///
/// # Errors
///
/// Returns `ConfigError::NoDataDir` if the platform has no cache directory.
pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => dirs::cache_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(ConfigError::NoDataDir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.default_volume, 70);
        assert!(config.auto_start_audio);
        assert_eq!(config.autosave_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"defaultVolume": 25}"#).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_volume, 25);
        assert!(config.auto_start_audio);
        assert_eq!(config.autosave_interval_secs, 60);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let result = Config::load(dir.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_zero_autosave_interval_is_raised() {
        let config = Config {
            autosave_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.autosave_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/focusplay-test"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/focusplay-test"));
    }

    #[test]
    fn test_default_data_dir_is_under_cache() {
        if let Ok(dir) = resolve_data_dir(None) {
            assert!(dir.ends_with(APP_DIR_NAME));
        }
    }
}
