//! Named timer profiles.
//!
//! A profile bundles a session length with optional background music. The
//! list lives in `profiles.json` in the data directory and is seeded with
//! [`default_profiles`] the first time it is read.

mod error;

pub use error::ProfileError;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

use crate::session::write_atomic;

/// File name of the profile list inside the data directory.
pub const PROFILES_FILE_NAME: &str = "profiles.json";

/// Longest accepted profile id, in characters.
pub const MAX_ID_CHARS: usize = 64;

/// Longest accepted session length: ten hours.
pub const MAX_DURATION_SEC: u32 = 600 * 60;

// ============================================================================
// Profile
// ============================================================================

/// A named timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// Session length in seconds.
    pub duration_sec: u32,
    /// File to loop, or folder to shuffle. An empty string on disk means none.
    #[serde(
        default,
        deserialize_with = "empty_path_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub music_path: Option<PathBuf>,
    /// Shuffle the `music_path` folder instead of looping one file.
    #[serde(default)]
    pub shuffle: bool,
}

fn empty_path_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let path = Option::<PathBuf>::deserialize(deserializer)?;
    Ok(path.filter(|p| !p.as_os_str().is_empty()))
}

impl Profile {
    /// Creates a silent profile.
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_sec: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_sec,
            music_path: None,
            shuffle: false,
        }
    }

    /// Sets the music played with this profile.
    #[must_use]
    pub fn with_music(mut self, path: impl Into<PathBuf>, shuffle: bool) -> Self {
        self.music_path = Some(path.into());
        self.shuffle = shuffle;
        self
    }

    /// Checks the invariants every stored profile must hold.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Invalid` naming the first broken rule.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(ProfileError::Invalid("id must not be empty".to_string()));
        }
        if id != self.id || id.chars().any(char::is_whitespace) {
            return Err(ProfileError::Invalid(format!(
                "id '{}' must not contain whitespace",
                self.id
            )));
        }
        if id.chars().count() > MAX_ID_CHARS {
            return Err(ProfileError::Invalid(format!(
                "id must be at most {} characters",
                MAX_ID_CHARS
            )));
        }
        if self.duration_sec == 0 || self.duration_sec > MAX_DURATION_SEC {
            return Err(ProfileError::Invalid(format!(
                "duration must be between 1 second and {} minutes",
                MAX_DURATION_SEC / 60
            )));
        }
        if self.shuffle && self.music_path.is_none() {
            return Err(ProfileError::Invalid(
                "shuffle needs a music folder".to_string(),
            ));
        }
        Ok(())
    }
}

/// Profiles written on first run.
#[must_use]
pub fn default_profiles() -> Vec<Profile> {
    vec![
        Profile::new("deep-work", "Deep Work (90 min)", 90 * 60),
        Profile::new("pomodoro", "Pomodoro (25 min)", 25 * 60),
        Profile::new("short-break", "Short Break (5 min)", 5 * 60),
    ]
}

// ============================================================================
// ProfileStore
// ============================================================================

/// Reads and writes `profiles.json`.
///
/// Every call goes to disk; the CLI is short-lived and there is no cache to
/// keep coherent.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Creates a store that keeps its list under `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PROFILES_FILE_NAME),
        }
    }

    /// Returns the list path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every profile.
    ///
    /// A missing file is seeded with the defaults. An empty or malformed list
    /// reads as the defaults and is left untouched on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Vec<Profile>, ProfileError> {
        let stored = match self.read() {
            Ok(stored) => stored,
            Err(e) if e.is_corrupt() => {
                warn!("{}; using default profiles", e);
                return Ok(default_profiles());
            }
            Err(e) => return Err(e),
        };

        match stored {
            Some(profiles) if !profiles.is_empty() => Ok(profiles),
            Some(_) => {
                debug!("Empty profile list, using defaults");
                Ok(default_profiles())
            }
            None => {
                let profiles = default_profiles();
                if let Err(e) = self.write(&profiles) {
                    warn!("Failed to write default profiles: {}", e);
                }
                Ok(profiles)
            }
        }
    }

    /// Looks up a profile by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be read.
    pub fn get(&self, id: &str) -> Result<Option<Profile>, ProfileError> {
        Ok(self.load()?.into_iter().find(|p| p.id == id))
    }

    /// Adds `profile`, or replaces the stored profile with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid, the stored list is
    /// malformed, or the list cannot be written.
    pub fn upsert(&self, profile: Profile) -> Result<(), ProfileError> {
        profile.validate()?;
        let mut profiles = self.read_for_update()?;

        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => profiles.push(profile.clone()),
        }

        self.write(&profiles)?;
        info!("Saved profile {}", profile.id);
        Ok(())
    }

    /// Deletes a profile and returns it.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotFound` if no profile has `id`, or an error
    /// if the list cannot be read or written.
    pub fn remove(&self, id: &str) -> Result<Profile, ProfileError> {
        let mut profiles = self.read_for_update()?;
        let index = profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;

        let removed = profiles.remove(index);
        self.write(&profiles)?;
        info!("Removed profile {}", id);
        Ok(removed)
    }

    /// The list an edit starts from. A malformed file is an error here so
    /// that an edit never overwrites it.
    fn read_for_update(&self) -> Result<Vec<Profile>, ProfileError> {
        Ok(match self.read()? {
            Some(profiles) if !profiles.is_empty() => profiles,
            _ => default_profiles(),
        })
    }

    fn read(&self) -> Result<Option<Vec<Profile>>, ProfileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProfileError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ProfileError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    fn write(&self, profiles: &[Profile]) -> Result<(), ProfileError> {
        let data = serde_json::to_vec_pretty(profiles)?;
        write_atomic(&self.path, &data)?;
        debug!("Wrote {} profiles to {}", profiles.len(), self.path.display());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
