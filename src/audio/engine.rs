//! Playback state machine.
//!
//! States: Idle → Playing → Stopped, where Stopped behaves like Idle for the
//! next play request. Every play request cancels the previous run, installs a
//! fresh cancellation token and spawns one background task that owns the
//! current `Playback`. Failures are reported through `trackInfo`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::AudioError;
use super::playlist::{scan_tracks, track_name, ShuffledPlaylist};
use super::volume::Volume;
use super::{AudioOutput, Playback};
use crate::events::EventSink;
use crate::types::{AudioPlaybackState, AudioStatus, Event};

/// `trackInfo` while a single file loops.
pub const LOOPING_INFO: &str = "Looping";

/// `trackInfo` when a folder holds nothing to play.
pub const NO_TRACKS_INFO: &str = "No MP3s found";

/// `trackInfo` when a whole shuffle pass failed to play.
pub const NO_PLAYABLE_INFO: &str = "No playable MP3s";

/// How often the active playback is checked for completion.
const FINISH_POLL_INTERVAL: Duration = Duration::from_millis(50);

fn shuffle_info(count: usize) -> String {
    format!("Shuffle folder · {} tracks", count)
}

#[derive(Default)]
struct AudioRunState {
    status: AudioStatus,
    volume: Volume,
    cancel: Option<CancellationToken>,
    playback: Option<Arc<dyn Playback>>,
}

impl AudioRunState {
    /// Cancels the active run and hands back its playback for stopping.
    fn take_run(&mut self) -> Option<Arc<dyn Playback>> {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.playback.take()
    }
}

enum TrackEnd {
    Finished,
    Cancelled,
}

struct AudioShared {
    state: Mutex<AudioRunState>,
    output: Arc<dyn AudioOutput>,
    sink: Arc<dyn EventSink>,
}

impl AudioShared {
    fn lock(&self) -> MutexGuard<'_, AudioRunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancels the active run without reporting a new status.
    fn halt(&self) {
        let previous = self.lock().take_run();
        if let Some(playback) = previous {
            playback.stop();
        }
    }

    /// Replaces the active run (if any) and reports `status`.
    fn replace_run(&self, status: AudioStatus, token: Option<CancellationToken>) {
        let previous = {
            let mut state = self.lock();
            let previous = state.take_run();
            state.cancel = token;
            state.status = status.clone();
            previous
        };
        if let Some(playback) = previous {
            playback.stop();
        }
        self.sink.emit(Event::AudioStateChanged(status));
    }

    /// Updates the status of a live run. Returns false if the run is gone.
    fn announce(&self, token: &CancellationToken, status: AudioStatus) -> bool {
        {
            let mut state = self.lock();
            if token.is_cancelled() {
                return false;
            }
            state.status = status.clone();
        }
        if token.is_cancelled() {
            return false;
        }
        self.sink.emit(Event::AudioStateChanged(status));
        true
    }

    /// Ends a run from inside its task.
    fn finish(&self, token: &CancellationToken, status: AudioStatus) {
        {
            let mut state = self.lock();
            if token.is_cancelled() {
                return;
            }
            state.cancel = None;
            state.playback = None;
            state.status = status.clone();
        }
        self.sink.emit(Event::AudioStateChanged(status));
    }

    /// Plays one file to the end, or until the run is cancelled.
    async fn play_track(&self, token: &CancellationToken, path: &Path) -> Result<TrackEnd, AudioError> {
        let volume = {
            let state = self.lock();
            if token.is_cancelled() {
                return Ok(TrackEnd::Cancelled);
            }
            state.volume
        };

        // Opening and decoding reads the file, so keep it off the runtime.
        let playback = tokio::task::spawn_blocking({
            let output = Arc::clone(&self.output);
            let path = path.to_path_buf();
            move || output.play_file(&path, volume)
        })
        .await
        .map_err(|e| AudioError::StreamError(format!("playback task failed: {}", e)))??;

        let current_volume = {
            let mut state = self.lock();
            if token.is_cancelled() {
                None
            } else {
                state.playback = Some(Arc::clone(&playback));
                Some(state.volume)
            }
        };
        match current_volume {
            None => {
                playback.stop();
                return Ok(TrackEnd::Cancelled);
            }
            // Volume moved while the file was opening.
            Some(v) if v != volume => playback.set_volume(v),
            Some(_) => {}
        }

        let mut poll = interval_at(Instant::now() + FINISH_POLL_INTERVAL, FINISH_POLL_INTERVAL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let end = loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    playback.stop();
                    break TrackEnd::Cancelled;
                }

                _ = poll.tick() => {
                    if playback.is_finished() {
                        break TrackEnd::Finished;
                    }
                }
            }
        };

        let mut state = self.lock();
        if state
            .playback
            .as_ref()
            .is_some_and(|p| Arc::ptr_eq(p, &playback))
        {
            state.playback = None;
        }
        Ok(end)
    }
}

async fn run_looping(shared: Arc<AudioShared>, token: CancellationToken, path: PathBuf) {
    loop {
        match shared.play_track(&token, &path).await {
            Ok(TrackEnd::Finished) => debug!("Restarting loop of {}", path.display()),
            Ok(TrackEnd::Cancelled) => return,
            Err(e) => {
                if e.is_device_error() {
                    warn!("Audio device failed while looping: {}", e);
                } else {
                    warn!("Looped playback failed: {}", e);
                }
                shared.finish(
                    &token,
                    AudioStatus::new(
                        AudioPlaybackState::Stopped,
                        track_name(&path),
                        format!("Error: {}", e),
                    ),
                );
                return;
            }
        }
    }
}

/// Plays the playlist forever. The first track was already announced by the
/// caller.
async fn run_shuffle(shared: Arc<AudioShared>, token: CancellationToken, mut playlist: ShuffledPlaylist) {
    let info = shuffle_info(playlist.len());
    let mut announced = true;
    let mut played_this_pass = false;

    loop {
        let path = playlist.current().to_path_buf();
        if !announced {
            let status = AudioStatus::new(AudioPlaybackState::Playing, track_name(&path), info.as_str());
            if !shared.announce(&token, status) {
                return;
            }
        }
        announced = false;

        match shared.play_track(&token, &path).await {
            Ok(TrackEnd::Finished) => played_this_pass = true,
            Ok(TrackEnd::Cancelled) => return,
            Err(e) if e.is_file_error() => warn!("Skipping {}: {}", path.display(), e),
            Err(e) => {
                // The device is gone; every other track would fail the same way.
                warn!("Shuffled playback failed: {}", e);
                shared.finish(
                    &token,
                    AudioStatus::new(
                        AudioPlaybackState::Stopped,
                        track_name(&path),
                        format!("Error: {}", e),
                    ),
                );
                return;
            }
        }

        if playlist.advance() {
            if !played_this_pass {
                warn!("No track in the folder could be played");
                shared.finish(
                    &token,
                    AudioStatus::new(AudioPlaybackState::Stopped, "", NO_PLAYABLE_INFO),
                );
                return;
            }
            debug!("Shuffle pass complete, reshuffled");
            played_this_pass = false;
        }

        tokio::task::yield_now().await;
    }
}

/// Audio engine that owns playback state and its background run.
///
/// Operations never fail; problems end up in [`AudioStatus::track_info`].
/// Must be used from within a Tokio runtime.
pub struct AudioEngine {
    shared: Arc<AudioShared>,
}

impl AudioEngine {
    pub fn new(output: Arc<dyn AudioOutput>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            shared: Arc::new(AudioShared {
                state: Mutex::new(AudioRunState::default()),
                output,
                sink,
            }),
        }
    }

    /// Loops a single file until stopped.
    ///
    /// Reports `Playing` right away; an unreadable file later settles to
    /// `Stopped` with an `Error: ...` track info.
    pub fn play_looping(&self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        info!("Looping {}", path.display());

        let token = CancellationToken::new();
        self.shared.replace_run(
            AudioStatus::new(AudioPlaybackState::Playing, track_name(&path), LOOPING_INFO),
            Some(token.clone()),
        );
        tokio::spawn(run_looping(Arc::clone(&self.shared), token, path));
    }

    /// Plays every MP3 directly inside `folder` in shuffled order, forever.
    ///
    /// An unreadable or empty folder stops immediately without starting a
    /// background run.
    pub fn play_shuffle_folder(&self, folder: impl AsRef<Path>) {
        let folder = folder.as_ref();
        self.shared.halt();

        let tracks = scan_tracks(folder).unwrap_or_else(|e| {
            warn!("Cannot scan music folder: {}", e);
            Vec::new()
        });

        let Some(playlist) = ShuffledPlaylist::new(tracks) else {
            info!("No tracks in {}", folder.display());
            self.shared.replace_run(
                AudioStatus::new(AudioPlaybackState::Stopped, "", NO_TRACKS_INFO),
                None,
            );
            return;
        };

        info!("Shuffling {} tracks from {}", playlist.len(), folder.display());
        let token = CancellationToken::new();
        self.shared.replace_run(
            AudioStatus::new(
                AudioPlaybackState::Playing,
                track_name(playlist.current()),
                shuffle_info(playlist.len()),
            ),
            Some(token.clone()),
        );
        tokio::spawn(run_shuffle(Arc::clone(&self.shared), token, playlist));
    }

    /// Stops playback and drops any buffered audio. Always reports `Stopped`.
    pub fn stop(&self) {
        let previous = {
            let mut state = self.shared.lock();
            let previous = state.take_run();
            state.status = AudioStatus::stopped();
            previous
        };
        if let Some(playback) = previous {
            playback.stop();
        }
        self.shared.output.clear();

        info!("Audio stopped");
        self.shared
            .sink
            .emit(Event::AudioStateChanged(AudioStatus::stopped()));
    }

    /// Sets the volume from a 0–100 value, clamping out-of-range input.
    ///
    /// Applies to the current track without restarting it.
    pub fn set_volume(&self, percent: i32) {
        let volume = Volume::from_percent(percent);
        let playback = {
            let mut state = self.shared.lock();
            state.volume = volume;
            state.playback.clone()
        };
        debug!("Volume {:.2} (gain {:.2})", volume.linear(), volume.gain());

        if let Some(playback) = playback {
            playback.set_volume(volume);
        }
    }

    pub fn get_state(&self) -> AudioStatus {
        self.shared.lock().status.clone()
    }

    /// Current normalized volume.
    pub fn volume(&self) -> f64 {
        self.shared.lock().volume.linear()
    }

    /// Returns true while a background run is installed.
    pub fn is_active(&self) -> bool {
        self.shared.lock().cancel.is_some()
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shared.halt();
    }
}

impl std::fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioEngine")
            .field("state", &self.get_state())
            .field("volume", &self.volume())
            .finish_non_exhaustive()
    }
}
