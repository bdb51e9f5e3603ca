//! Core data types for FocusPlay.
//!
//! This module defines the data structures used for:
//! - The persisted session record
//! - Timer and audio state snapshots handed to the UI layer
//! - Notifications emitted by the engines

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// SessionSnapshot
// ============================================================================

/// Durable record of an in-progress timer.
///
/// Serialized as `{"profileId", "totalSec", "remainingSec", "savedAt"}` where
/// `savedAt` is a Unix timestamp in seconds, stamped by the store on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Profile the session belongs to
    pub profile_id: String,
    /// Full session length in seconds
    pub total_sec: u32,
    /// Seconds left when the snapshot was taken
    pub remaining_sec: u32,
    /// Unix seconds at time of write (0 = never written)
    #[serde(default)]
    pub saved_at: i64,
}

impl SessionSnapshot {
    /// Creates an unsaved snapshot.
    pub fn new(profile_id: impl Into<String>, total_sec: u32, remaining_sec: u32) -> Self {
        Self {
            profile_id: profile_id.into(),
            total_sec,
            remaining_sec,
            saved_at: 0,
        }
    }

    /// Seconds already spent in the session.
    pub fn elapsed_sec(&self) -> u32 {
        self.total_sec.saturating_sub(self.remaining_sec)
    }
}

// ============================================================================
// TimerPhase
// ============================================================================

/// Represents the current phase of the countdown timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Nothing has been started yet
    Idle,
    /// Counting down
    Running,
    /// Countdown suspended, remaining time kept
    Paused,
    /// Countdown reached zero on its own
    Completed,
    /// Countdown was stopped by the caller
    Stopped,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Completed => "completed",
            TimerPhase::Stopped => "stopped",
        }
    }

    /// Returns true if the timer is actively counting down.
    pub fn is_active(&self) -> bool {
        matches!(self, TimerPhase::Running)
    }

    /// Returns true if a session is in progress (running or paused).
    pub fn has_session(&self) -> bool {
        matches!(self, TimerPhase::Running | TimerPhase::Paused)
    }
}

impl Default for TimerPhase {
    fn default() -> Self {
        TimerPhase::Idle
    }
}

// ============================================================================
// TimerStatus
// ============================================================================

/// Consistent view of the timer, taken under the engine lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    /// Whether a countdown is ticking
    pub running: bool,
    /// Seconds left
    pub remaining_sec: u32,
    /// Full session length
    pub total_sec: u32,
    /// Profile of the current (or last) session
    pub profile_id: String,
    /// Full state-machine phase
    pub phase: TimerPhase,
}

// ============================================================================
// Audio state
// ============================================================================

/// Playback state reported by the audio engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioPlaybackState {
    /// Nothing played yet
    Idle,
    /// A run is active
    Playing,
    /// Stopped by the caller or by a failure
    Stopped,
}

impl AudioPlaybackState {
    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioPlaybackState::Idle => "idle",
            AudioPlaybackState::Playing => "playing",
            AudioPlaybackState::Stopped => "stopped",
        }
    }
}

impl Default for AudioPlaybackState {
    fn default() -> Self {
        AudioPlaybackState::Idle
    }
}

/// Audio status payload, also carried by `audioStateChanged`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStatus {
    /// Playback state
    pub state: AudioPlaybackState,
    /// File name of the current track (empty when idle or stopped)
    pub track_name: String,
    /// Free-text status, e.g. "Looping" or "Shuffle folder · 12 tracks"
    pub track_info: String,
}

impl AudioStatus {
    /// Creates a status value.
    pub fn new(
        state: AudioPlaybackState,
        track_name: impl Into<String>,
        track_info: impl Into<String>,
    ) -> Self {
        Self {
            state,
            track_name: track_name.into(),
            track_info: track_info.into(),
        }
    }

    /// Status reported after an explicit stop.
    pub fn stopped() -> Self {
        Self::new(AudioPlaybackState::Stopped, "", "")
    }
}

// ============================================================================
// Event
// ============================================================================

/// Event name for a timer tick.
pub const TIMER_TICKED: &str = "timerTicked";
/// Event name for natural timer completion.
pub const TIMER_COMPLETED: &str = "timerCompleted";
/// Event name for audio state transitions.
pub const AUDIO_STATE_CHANGED: &str = "audioStateChanged";

/// Notifications emitted by the engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// One second elapsed
    TimerTicked {
        /// Seconds left after this tick
        remaining_sec: u32,
        /// Profile of the running session
        profile_id: String,
    },
    /// Countdown reached zero
    TimerCompleted {
        /// Profile of the finished session
        profile_id: String,
    },
    /// Audio state changed
    AudioStateChanged(AudioStatus),
}

impl Event {
    /// Returns the wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Event::TimerTicked { .. } => TIMER_TICKED,
            Event::TimerCompleted { .. } => TIMER_COMPLETED,
            Event::AudioStateChanged(_) => AUDIO_STATE_CHANGED,
        }
    }

    /// Returns the structured payload of the event.
    pub fn payload(&self) -> Value {
        match self {
            Event::TimerTicked {
                remaining_sec,
                profile_id,
            } => json!({
                "remainingSec": remaining_sec,
                "profileId": profile_id,
            }),
            Event::TimerCompleted { profile_id } => json!({ "profileId": profile_id }),
            Event::AudioStateChanged(status) => json!({
                "state": status.state.as_str(),
                "trackName": status.track_name,
                "trackInfo": status.track_info,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // SessionSnapshot Tests
    // ------------------------------------------------------------------------

    mod session_snapshot_tests {
        use super::*;

        #[test]
        fn test_serialize_layout() {
            let snapshot = SessionSnapshot {
                profile_id: "writing".to_string(),
                total_sec: 1500,
                remaining_sec: 1200,
                saved_at: 1_700_000_000,
            };
            let value = serde_json::to_value(&snapshot).unwrap();

            assert_eq!(value["profileId"], "writing");
            assert_eq!(value["totalSec"], 1500);
            assert_eq!(value["remainingSec"], 1200);
            assert_eq!(value["savedAt"], 1_700_000_000i64);
        }

        #[test]
        fn test_missing_saved_at_defaults_to_zero() {
            let json = r#"{"profileId":"p","totalSec":60,"remainingSec":30}"#;
            let snapshot: SessionSnapshot = serde_json::from_str(json).unwrap();
            assert_eq!(snapshot.saved_at, 0);
        }

        #[test]
        fn test_elapsed_sec() {
            let snapshot = SessionSnapshot::new("p", 1500, 1200);
            assert_eq!(snapshot.elapsed_sec(), 300);
        }
    }

    // ------------------------------------------------------------------------
    // TimerPhase Tests
    // ------------------------------------------------------------------------

    mod timer_phase_tests {
        use super::*;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(TimerPhase::default(), TimerPhase::Idle);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(TimerPhase::Idle.as_str(), "idle");
            assert_eq!(TimerPhase::Running.as_str(), "running");
            assert_eq!(TimerPhase::Paused.as_str(), "paused");
            assert_eq!(TimerPhase::Completed.as_str(), "completed");
            assert_eq!(TimerPhase::Stopped.as_str(), "stopped");
        }

        #[test]
        fn test_is_active_only_when_running() {
            assert!(TimerPhase::Running.is_active());
            assert!(!TimerPhase::Paused.is_active());
            assert!(!TimerPhase::Completed.is_active());
        }

        #[test]
        fn test_has_session() {
            assert!(TimerPhase::Running.has_session());
            assert!(TimerPhase::Paused.has_session());
            assert!(!TimerPhase::Idle.has_session());
            assert!(!TimerPhase::Stopped.has_session());
        }
    }

    // ------------------------------------------------------------------------
    // Event Tests
    // ------------------------------------------------------------------------

    mod event_tests {
        use super::*;

        #[test]
        fn test_tick_payload() {
            let event = Event::TimerTicked {
                remaining_sec: 42,
                profile_id: "deep-work".to_string(),
            };
            assert_eq!(event.name(), "timerTicked");
            assert_eq!(
                event.payload(),
                json!({"remainingSec": 42, "profileId": "deep-work"})
            );
        }

        #[test]
        fn test_completed_payload() {
            let event = Event::TimerCompleted {
                profile_id: "p".to_string(),
            };
            assert_eq!(event.name(), "timerCompleted");
            assert_eq!(event.payload(), json!({"profileId": "p"}));
        }

        #[test]
        fn test_audio_payload() {
            let event = Event::AudioStateChanged(AudioStatus::new(
                AudioPlaybackState::Playing,
                "rain.mp3",
                "Looping",
            ));
            assert_eq!(event.name(), "audioStateChanged");
            assert_eq!(
                event.payload(),
                json!({"state": "playing", "trackName": "rain.mp3", "trackInfo": "Looping"})
            );
        }

        #[test]
        fn test_stopped_status_has_empty_fields() {
            let status = AudioStatus::stopped();
            assert_eq!(status.state, AudioPlaybackState::Stopped);
            assert!(status.track_name.is_empty());
            assert!(status.track_info.is_empty());
        }
    }
}
