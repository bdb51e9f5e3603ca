//! FocusPlay Library
//!
//! This library provides the core functionality for the FocusPlay CLI.
//! It includes:
//! - Timer engine: countdown with pause, resume, stop and periodic autosave
//! - Audio engine: looping or shuffled background music with live volume
//! - Session store: the single resumable session record, JSON on disk
//! - Profiles: named session lengths with optional music
//! - Stats: completed sessions today and the daily streak
//! - Event sinks: how engines report ticks, completion and audio changes
//! - CLI command parsing and display utilities
//!
//! The two engines are independent. Starting music together with a timer
//! is a decision of the caller (see [`cli::foreground`]).

pub mod audio;
pub mod cli;
pub mod config;
pub mod events;
pub mod profile;
pub mod session;
pub mod stats;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    AudioPlaybackState, AudioStatus, Event, SessionSnapshot, TimerPhase, TimerStatus,
    AUDIO_STATE_CHANGED, TIMER_COMPLETED, TIMER_TICKED,
};

// Re-export engine types
pub use audio::{AudioEngine, AudioError, AudioOutput, MockAudioOutput, Playback, RodioOutput, Volume};
pub use timer::TimerEngine;

// Re-export collaborator types
pub use config::{Config, ConfigError};
pub use events::{ChannelEventSink, EventSink, MockEventSink, TracingEventSink};
pub use profile::{Profile, ProfileError, ProfileStore};
pub use session::{JsonSessionStore, MemorySessionStore, SessionError, SessionStore};
pub use stats::{Stats, StatsError, StatsStore};
