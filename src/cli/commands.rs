//! Command definitions for the FocusPlay CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::profile::{Profile, MAX_ID_CHARS};

/// Profile `start` runs when `--profile` is not given.
pub const DEFAULT_PROFILE: &str = "pomodoro";

// ============================================================================
// CLI Structure
// ============================================================================

/// FocusPlay - focus sessions with background music
#[derive(Parser, Debug)]
#[command(
    name = "focusplay",
    version,
    about = "Focus timer with background music",
    long_about = "Runs a focus countdown in the terminal, optionally with a looping track \
                  or a shuffled music folder. Interrupted sessions are saved and can be \
                  resumed for up to 24 hours.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for config, profiles, stats and the session record
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a new focus session
    Start(StartArgs),

    /// Continue the saved session
    Resume(MusicArgs),

    /// Show the saved session and today's stats
    Status,

    /// Delete the saved session
    Clear,

    /// List, add or remove timer profiles
    Profiles {
        #[command(subcommand)]
        action: Option<ProfileCommands>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommands {
    /// List profiles (the default)
    List,

    /// Add a profile, or replace the one with the same id
    Add(ProfileArgs),

    /// Remove a profile
    Remove {
        /// Profile id
        #[arg(value_parser = validate_profile)]
        id: String,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Arguments for the start command
#[derive(Args, Debug, Clone)]
pub struct StartArgs {
    /// Profile to run; supplies the length and music unless overridden
    #[arg(short, long, default_value = DEFAULT_PROFILE, value_parser = validate_profile)]
    pub profile: String,

    /// Session length in minutes (1-600), overriding the profile
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=600))]
    pub minutes: Option<u32>,

    #[command(flatten)]
    pub music: MusicArgs,
}

impl StartArgs {
    /// Session length from `--minutes`, in seconds.
    #[must_use]
    pub fn duration_override_sec(&self) -> Option<u32> {
        self.minutes.map(|m| m * 60)
    }
}

/// Arguments for `profiles add`
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Profile id
    #[arg(value_parser = validate_profile)]
    pub id: String,

    /// Session length in minutes (1-600)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=600))]
    pub minutes: u32,

    /// Display name (defaults to the id)
    #[arg(long)]
    pub name: Option<String>,

    /// MP3 file to loop, or a folder with --shuffle
    #[arg(long, value_name = "PATH")]
    pub music: Option<PathBuf>,

    /// Shuffle every MP3 in the --music folder
    #[arg(long, requires = "music")]
    pub shuffle: bool,
}

impl ProfileArgs {
    /// Builds the profile to store.
    #[must_use]
    pub fn to_profile(&self) -> Profile {
        let name = self.name.clone().unwrap_or_else(|| self.id.clone());
        let profile = Profile::new(self.id.clone(), name, self.minutes * 60);
        match &self.music {
            Some(path) => profile.with_music(path, self.shuffle),
            None => profile,
        }
    }
}

/// Background music options shared by `start` and `resume`
#[derive(Args, Debug, Clone, Default)]
pub struct MusicArgs {
    /// MP3 file to loop, or a folder with --shuffle
    #[arg(long, value_name = "PATH")]
    pub music: Option<PathBuf>,

    /// Shuffle every MP3 in the --music folder
    #[arg(long, requires = "music")]
    pub shuffle: bool,

    /// Playback volume (0-100)
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=100))]
    pub volume: Option<i32>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the profile id.
///
/// - Must not be blank
/// - Must not contain whitespace
/// - Must not exceed 64 characters
fn validate_profile(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("profile must not be empty".to_string());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err("profile must not contain whitespace".to_string());
    }
    if trimmed.chars().count() > MAX_ID_CHARS {
        return Err(format!("profile must be at most {} characters", MAX_ID_CHARS));
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Tests
// ============================================================================
