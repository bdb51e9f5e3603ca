//! Audio output implementation using rodio.
//!
//! This module provides the `RodioOutput`, which owns the default output
//! device and hands out one `Sink` per played file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread;

use crossbeam_channel::{bounded, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::AudioError;
use super::volume::Volume;
use super::{AudioOutput, Playback};

/// An audio output backed by the default rodio device.
///
/// `rodio::OutputStream` must stay on the thread that created it, so the
/// stream lives on a dedicated `audio-output` thread for as long as this
/// value exists. Only the `Send` stream handle crosses threads.
pub struct RodioOutput {
    /// Handle to the output stream for creating sinks.
    handle: OutputStreamHandle,
    /// Sinks handed out so far, for [`AudioOutput::clear`].
    sinks: Mutex<Vec<Weak<Sink>>>,
    /// Dropping this releases the device thread.
    _shutdown: Sender<()>,
}

impl RodioOutput {
    /// Opens the default output device.
    ///
    /// # Errors
    ///
    /// Returns `AudioError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new() -> Result<Self, AudioError> {
        let (ready_tx, ready_rx) = bounded::<Result<OutputStreamHandle, AudioError>>(1);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);

        thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if ready_tx.send(Ok(handle)).is_ok() {
                        // Blocks until the sender is dropped.
                        let _ = shutdown_rx.recv();
                    }
                    drop(stream);
                    debug!("Audio output stream closed");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(AudioError::DeviceNotAvailable(e.to_string())));
                }
            })
            .map_err(|e| AudioError::DeviceNotAvailable(e.to_string()))?;

        let handle = ready_rx
            .recv()
            .map_err(|e| AudioError::DeviceNotAvailable(e.to_string()))??;

        debug!("Audio output stream initialized");

        Ok(Self {
            handle,
            sinks: Mutex::new(Vec::new()),
            _shutdown: shutdown_tx,
        })
    }

    fn track_sink(&self, sink: &Arc<Sink>) {
        let mut sinks = self.sinks.lock().unwrap_or_else(PoisonError::into_inner);
        sinks.retain(|s| s.strong_count() > 0);
        sinks.push(Arc::downgrade(sink));
    }
}

impl AudioOutput for RodioOutput {
    fn play_file(&self, path: &Path, volume: Volume) -> Result<Arc<dyn Playback>, AudioError> {
        let file = File::open(path)
            .map_err(|e| AudioError::FileNotFound(format!("{}: {}", path.display(), e)))?;

        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| AudioError::DecodeError(format!("{}: {}", path.display(), e)))?;

        let sink =
            Sink::try_new(&self.handle).map_err(|e| AudioError::StreamError(e.to_string()))?;
        sink.set_volume(volume.amplitude());
        sink.append(decoder);

        let sink = Arc::new(sink);
        self.track_sink(&sink);

        debug!("Playing {}", path.display());
        Ok(Arc::new(RodioPlayback { sink }))
    }

    fn clear(&self) {
        let sinks: Vec<Weak<Sink>> = self
            .sinks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for sink in sinks.iter().filter_map(Weak::upgrade) {
            sink.stop();
        }
    }
}

impl std::fmt::Debug for RodioOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let live = self
            .sinks
            .lock()
            .map(|s| s.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0);
        f.debug_struct("RodioOutput")
            .field("live_sinks", &live)
            .finish_non_exhaustive()
    }
}

/// One file streaming into a rodio sink.
struct RodioPlayback {
    sink: Arc<Sink>,
}

impl Playback for RodioPlayback {
    fn set_volume(&self, volume: Volume) {
        self.sink.set_volume(volume.amplitude());
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn stop(&self) {
        self.sink.stop();
    }
}

/// Opens the default output device, returning None if audio is unavailable.
///
/// If audio initialization fails, a warning is logged and None is returned.
#[must_use]
pub fn try_create_output() -> Option<Arc<RodioOutput>> {
    match RodioOutput::new() {
        Ok(output) => Some(Arc::new(output)),
        Err(e) => {
            warn!("Audio not available, music disabled: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: These tests may run in environments without audio hardware
    // (e.g., CI containers). Each test returns early when no device exists.

    #[test]
    fn test_try_create_output_no_panic() {
        let _ = try_create_output();
    }

    #[test]
    fn test_play_missing_file_is_file_error() {
        let output = match RodioOutput::new() {
            Ok(o) => o,
            Err(_) => return,
        };

        let result = output.play_file(Path::new("/nonexistent/rain.mp3"), Volume::default());
        assert!(matches!(result, Err(AudioError::FileNotFound(_))));
    }

    #[test]
    fn test_play_garbage_is_decode_error() {
        let output = match RodioOutput::new() {
            Ok(o) => o,
            Err(_) => return,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let result = output.play_file(&path, Volume::default());
        assert!(matches!(result, Err(AudioError::DecodeError(_))));
    }

    #[test]
    fn test_clear_without_sinks() {
        let output = match RodioOutput::new() {
            Ok(o) => o,
            Err(_) => return,
        };
        output.clear();
        assert!(format!("{:?}", output).contains("RodioOutput"));
    }
}
