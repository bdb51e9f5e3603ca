//! Background music playback for FocusPlay.
//!
//! This module provides:
//!
//! - Looped playback of a single file
//! - Shuffled playback of every MP3 in a folder, reshuffled after each pass
//! - Live volume changes with a logarithmic gain curve
//! - Graceful degradation: failures become a status string, never an error
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   AudioEngine    │ ← Public operations, one background run at a time
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   AudioOutput    │────▶│   RodioOutput    │
//! │   (trait)        │     │  (device thread) │
//! │                  │     ├──────────────────┤
//! │                  │────▶│ MockAudioOutput  │
//! └──────────────────┘     │  (tests)         │
//!                          └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use focusplay::audio::{AudioEngine, RodioOutput};
//! use focusplay::events::TracingEventSink;
//!
//! # async fn demo() {
//! let output = Arc::new(RodioOutput::new().expect("audio init"));
//! let engine = AudioEngine::new(output, Arc::new(TracingEventSink));
//!
//! engine.set_volume(60);
//! engine.play_shuffle_folder("/home/me/Music/focus");
//! # }
//! ```

mod engine;
mod error;
mod output;
mod playlist;
mod volume;

pub use engine::{AudioEngine, LOOPING_INFO, NO_PLAYABLE_INFO, NO_TRACKS_INFO};
pub use error::AudioError;
pub use output::{try_create_output, RodioOutput};
pub use playlist::{is_supported, scan_tracks, track_name, ShuffledPlaylist, SUPPORTED_EXTENSION};
pub use volume::{linear_to_log, Volume, DEFAULT_VOLUME, SILENT_GAIN};

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Trait for audio output implementations.
///
/// This trait abstracts the output device, allowing for different
/// implementations (e.g., rodio-based, mock for testing).
pub trait AudioOutput: Send + Sync {
    /// Opens and decodes `path` and starts playing it at `volume`.
    ///
    /// May block while the file is opened and decoded; the engine calls it
    /// on the blocking pool. The file then plays in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded, or if the
    /// device refuses a new stream.
    fn play_file(&self, path: &Path, volume: Volume) -> Result<Arc<dyn Playback>, AudioError>;

    /// Drops all buffered and in-flight audio.
    fn clear(&self);
}

/// A single file being played.
pub trait Playback: Send + Sync {
    /// Applies a new volume without interrupting playback.
    fn set_volume(&self, volume: Volume);

    /// Returns true once the file has played to the end or was stopped.
    fn is_finished(&self) -> bool;

    /// Stops playback immediately.
    fn stop(&self);
}

/// Mock audio output for testing.
///
/// Every "file" plays for a fixed duration. Paths must exist on disk;
/// paths marked undecodable fail like a corrupt MP3 would. A lost device
/// fails every request with a stream error. An open delay makes `play_file`
/// block like a slow disk.
#[derive(Debug)]
pub struct MockAudioOutput {
    track_duration: Duration,
    device_lost: AtomicBool,
    open_delay: Mutex<Duration>,
    undecodable: Mutex<HashSet<PathBuf>>,
    played: Mutex<Vec<PathBuf>>,
    volumes: Arc<Mutex<Vec<Volume>>>,
    clear_count: AtomicUsize,
}

impl MockAudioOutput {
    #[must_use]
    pub fn new(track_duration: Duration) -> Self {
        Self {
            track_duration,
            device_lost: AtomicBool::new(false),
            open_delay: Mutex::new(Duration::ZERO),
            undecodable: Mutex::new(HashSet::new()),
            played: Mutex::new(Vec::new()),
            volumes: Arc::new(Mutex::new(Vec::new())),
            clear_count: AtomicUsize::new(0),
        }
    }

    pub fn set_undecodable(&self, path: impl Into<PathBuf>) {
        self.undecodable.lock().unwrap().insert(path.into());
    }

    /// Simulates the output device disappearing (or coming back).
    pub fn set_device_lost(&self, lost: bool) {
        self.device_lost.store(lost, Ordering::SeqCst);
    }

    /// Blocks every `play_file` call for `delay` before it returns.
    pub fn set_open_delay(&self, delay: Duration) {
        *self.open_delay.lock().unwrap() = delay;
    }

    /// Files that started playing, in order.
    #[must_use]
    pub fn played(&self) -> Vec<PathBuf> {
        self.played.lock().unwrap().clone()
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }

    /// Start volumes and live volume changes, in order.
    #[must_use]
    pub fn volumes(&self) -> Vec<Volume> {
        self.volumes.lock().unwrap().clone()
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }
}

impl Default for MockAudioOutput {
    fn default() -> Self {
        Self::new(Duration::from_millis(20))
    }
}

impl AudioOutput for MockAudioOutput {
    fn play_file(&self, path: &Path, volume: Volume) -> Result<Arc<dyn Playback>, AudioError> {
        let delay = *self.open_delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        if self.device_lost.load(Ordering::SeqCst) {
            return Err(AudioError::StreamError("mock device lost".to_string()));
        }
        if !path.is_file() {
            return Err(AudioError::FileNotFound(path.display().to_string()));
        }
        if self.undecodable.lock().unwrap().contains(path) {
            return Err(AudioError::DecodeError(format!(
                "{}: mock decode failure",
                path.display()
            )));
        }

        self.played.lock().unwrap().push(path.to_path_buf());
        self.volumes.lock().unwrap().push(volume);

        Ok(Arc::new(MockPlayback {
            started: Instant::now(),
            duration: self.track_duration,
            stopped: AtomicBool::new(false),
            volumes: Arc::clone(&self.volumes),
        }))
    }

    fn clear(&self) {
        self.clear_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct MockPlayback {
    started: Instant,
    duration: Duration,
    stopped: AtomicBool,
    volumes: Arc<Mutex<Vec<Volume>>>,
}

impl Playback for MockPlayback {
    fn set_volume(&self, volume: Volume) {
        self.volumes.lock().unwrap().push(volume);
    }

    fn is_finished(&self) -> bool {
        self.stopped.load(Ordering::SeqCst) || self.started.elapsed() >= self.duration
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
