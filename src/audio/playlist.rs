//! Music folder scanning and shuffle order.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::AudioError;

/// Extension of playable files, compared case-insensitively.
pub const SUPPORTED_EXTENSION: &str = "mp3";

/// Returns the display name of a track (its file name).
#[must_use]
pub fn track_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Returns true if the file name ends in `.mp3`, case-insensitively.
///
/// Compares the name suffix rather than [`Path::extension`], so a file
/// named just `.mp3` is playable too.
#[must_use]
pub fn is_supported(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy().to_ascii_lowercase();
            name.strip_suffix(SUPPORTED_EXTENSION)
                .is_some_and(|stem| stem.ends_with('.'))
        })
        .unwrap_or(false)
}

/// Lists the playable files directly inside `dir` (non-recursive).
///
/// The result is sorted by path for consistent ordering.
///
/// # Errors
///
/// Returns `AudioError::ScanError` if the directory cannot be read.
pub fn scan_tracks(dir: &Path) -> Result<Vec<PathBuf>, AudioError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AudioError::ScanError(format!("{}: {}", dir.display(), e)))?;

    let mut tracks: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| is_supported(path))
        .collect();

    tracks.sort();
    Ok(tracks)
}

/// Track list played in a random order that is reshuffled after every pass.
#[derive(Debug)]
pub struct ShuffledPlaylist {
    tracks: Vec<PathBuf>,
    position: usize,
    rng: StdRng,
}

impl ShuffledPlaylist {
    /// Creates a shuffled playlist. Returns `None` for an empty track list.
    #[must_use]
    pub fn new(tracks: Vec<PathBuf>) -> Option<Self> {
        Self::with_rng(tracks, StdRng::from_entropy())
    }

    /// Creates a shuffled playlist driven by a caller-supplied generator.
    #[must_use]
    pub fn with_rng(mut tracks: Vec<PathBuf>, mut rng: StdRng) -> Option<Self> {
        if tracks.is_empty() {
            return None;
        }
        tracks.shuffle(&mut rng);
        Some(Self {
            tracks,
            position: 0,
            rng,
        })
    }

    /// Number of tracks in one pass.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Always false; empty playlists cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The track to play now.
    #[must_use]
    pub fn current(&self) -> &Path {
        &self.tracks[self.position]
    }

    /// Moves to the next track.
    ///
    /// Returns true when a pass was completed, in which case the order has
    /// been reshuffled and playback starts over from the first track.
    pub fn advance(&mut self) -> bool {
        self.position += 1;
        if self.position < self.tracks.len() {
            return false;
        }
        self.position = 0;
        self.tracks.shuffle(&mut self.rng);
        true
    }

    /// Track order of the current pass.
    #[must_use]
    pub fn order(&self) -> &[PathBuf] {
        &self.tracks
    }
}
