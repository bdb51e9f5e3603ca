//! Display utilities for the FocusPlay CLI.
//!
//! This module provides formatted output for:
//! - Session start, completion and interruption
//! - The live countdown line
//! - Audio state changes
//! - Saved session status, daily stats and profiles

use std::io::{self, Write};

use chrono::NaiveDate;

use crate::profile::Profile;
use crate::stats::Stats;
use crate::types::{AudioPlaybackState, AudioStatus, SessionSnapshot, TimerStatus};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the header of a foreground session.
    pub fn show_session_started(profile_id: &str, remaining_sec: u32, total_sec: u32) {
        if remaining_sec == total_sec {
            println!("* Focus session started: {}", profile_id);
        } else {
            println!("> Focus session resumed: {}", profile_id);
        }
        println!("  Length: {}", Self::clock(total_sec));
        println!("  Press Ctrl-C to pause and save");
    }

    /// Redraws the countdown line in place.
    pub fn show_countdown(remaining_sec: u32, total_sec: u32) {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "\r{}", Self::countdown_line(remaining_sec, total_sec));
        let _ = stdout.flush();
    }

    /// Shows an audio state change on its own line.
    pub fn show_audio(status: &AudioStatus) {
        println!("\r{}", Self::audio_line(status));
    }

    /// Shows the natural end of a session.
    pub fn show_completed(profile_id: &str) {
        println!();
        println!("* Session complete: {}", profile_id);
    }

    /// Shows how to continue an interrupted session.
    pub fn show_interrupted(status: &TimerStatus, saved: bool) {
        println!();
        println!(
            "|| Paused {} with {} left",
            status.profile_id,
            Self::clock(status.remaining_sec)
        );
        if saved {
            println!("  Run `focusplay resume` within 24 hours to continue");
        } else {
            println!("  The session could not be saved");
        }
    }

    /// Shows the saved session, if any.
    pub fn show_status(snapshot: Option<&SessionSnapshot>) {
        match snapshot {
            Some(snapshot) => {
                println!("FocusPlay saved session");
                println!("─────────────────────────────");
                println!("Profile: {}", snapshot.profile_id);
                println!(
                    "Remaining: {} of {}",
                    Self::clock(snapshot.remaining_sec),
                    Self::clock(snapshot.total_sec)
                );
                println!("Elapsed: {}", Self::clock(snapshot.elapsed_sec()));
                if let Some(saved_at) = Self::saved_at(snapshot.saved_at) {
                    println!("Saved: {}", saved_at);
                }
            }
            None => println!("No saved session"),
        }
    }

    /// Shows today's count and the streak under the session status.
    pub fn show_stats(stats: &Stats, today: NaiveDate) {
        println!();
        println!("{}", Self::stats_line(stats.sessions_today, stats.active_streak(today)));
    }

    /// Shows the updated stats right after a session completes.
    pub fn show_progress(stats: &Stats) {
        println!("  {}", Self::stats_line(stats.sessions_today, stats.streak));
    }

    /// Lists profiles, one per line.
    pub fn show_profiles(profiles: &[Profile]) {
        for profile in profiles {
            println!("{}", Self::profile_line(profile));
        }
    }

    /// Shows a success message for saving a profile.
    pub fn show_profile_saved(profile: &Profile) {
        println!("+ Saved profile {} ({})", profile.id, Self::clock(profile.duration_sec));
    }

    /// Shows a success message for removing a profile.
    pub fn show_profile_removed(profile: &Profile) {
        println!("- Removed profile {}", profile.id);
    }

    /// Shows a success message for clearing the saved session.
    pub fn show_cleared() {
        println!("[] Saved session cleared");
    }

    /// Shows a non-fatal warning.
    pub fn show_warning(message: &str) {
        eprintln!("Warning: {}", message);
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {}", message);
    }

    fn countdown_line(remaining_sec: u32, total_sec: u32) -> String {
        format!(
            "  {} / {} remaining ",
            Self::clock(remaining_sec),
            Self::clock(total_sec)
        )
    }

    fn stats_line(sessions_today: u32, streak: u32) -> String {
        format!(
            "Today: {} · Streak: {}",
            Self::plural(sessions_today, "session"),
            Self::plural(streak, "day")
        )
    }

    fn profile_line(profile: &Profile) -> String {
        let music = match &profile.music_path {
            Some(path) if profile.shuffle => format!("  ♪ shuffle {}", path.display()),
            Some(path) => format!("  ♪ {}", path.display()),
            None => String::new(),
        };
        format!(
            "{:<14} {:>8}  {}{}",
            profile.id,
            Self::clock(profile.duration_sec),
            profile.name,
            music
        )
    }

    fn plural(count: u32, noun: &str) -> String {
        if count == 1 {
            format!("1 {}", noun)
        } else {
            format!("{} {}s", count, noun)
        }
    }

    fn audio_line(status: &AudioStatus) -> String {
        match status.state {
            AudioPlaybackState::Playing => {
                format!("♪ {} ({})", status.track_name, status.track_info)
            }
            AudioPlaybackState::Stopped if !status.track_info.is_empty() => {
                format!("♪ music stopped: {}", status.track_info)
            }
            AudioPlaybackState::Stopped => "♪ music stopped".to_string(),
            AudioPlaybackState::Idle => "♪ idle".to_string(),
        }
    }

    fn saved_at(unix: i64) -> Option<String> {
        chrono::DateTime::from_timestamp(unix, 0)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
    }

    /// Formats seconds as `MM:SS`, or `H:MM:SS` from one hour on.
    fn clock(total_seconds: u32) -> String {
        let (minutes, seconds) = Self::format_time(total_seconds);
        if minutes >= 60 {
            format!("{}:{:02}:{:02}", minutes / 60, minutes % 60, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Format Time Tests
    // ------------------------------------------------------------------------

    mod format_time_tests {
        use super::*;

        #[test]
        fn test_format_time_zero() {
            assert_eq!(Display::format_time(0), (0, 0));
        }

        #[test]
        fn test_format_time_mixed() {
            assert_eq!(Display::format_time(90), (1, 30));
        }

        #[test]
        fn test_clock_under_an_hour() {
            assert_eq!(Display::clock(0), "00:00");
            assert_eq!(Display::clock(25 * 60), "25:00");
            assert_eq!(Display::clock(59 * 60 + 59), "59:59");
        }

        #[test]
        fn test_clock_hours() {
            assert_eq!(Display::clock(3600), "1:00:00");
            assert_eq!(Display::clock(600 * 60), "10:00:00");
            assert_eq!(Display::clock(3600 + 61), "1:01:01");
        }
    }

    // ------------------------------------------------------------------------
    // Line Tests
    // ------------------------------------------------------------------------

    mod line_tests {
        use super::*;

        #[test]
        fn test_countdown_line() {
            assert_eq!(
                Display::countdown_line(1499, 1500),
                "  24:59 / 25:00 remaining "
            );
        }

        #[test]
        fn test_audio_line_playing() {
            let status = AudioStatus::new(AudioPlaybackState::Playing, "rain.mp3", "Looping");
            assert_eq!(Display::audio_line(&status), "♪ rain.mp3 (Looping)");
        }

        #[test]
        fn test_audio_line_stopped_with_reason() {
            let status = AudioStatus::new(AudioPlaybackState::Stopped, "", "No MP3s found");
            assert_eq!(Display::audio_line(&status), "♪ music stopped: No MP3s found");
            assert_eq!(Display::audio_line(&AudioStatus::stopped()), "♪ music stopped");
        }

        #[test]
        fn test_stats_line() {
            assert_eq!(Display::stats_line(0, 0), "Today: 0 sessions · Streak: 0 days");
            assert_eq!(Display::stats_line(1, 1), "Today: 1 session · Streak: 1 day");
            assert_eq!(Display::stats_line(4, 12), "Today: 4 sessions · Streak: 12 days");
        }

        #[test]
        fn test_profile_line() {
            let silent = Profile::new("pomodoro", "Pomodoro (25 min)", 1500);
            assert_eq!(
                Display::profile_line(&silent),
                "pomodoro          25:00  Pomodoro (25 min)"
            );

            let shuffled = Profile::new("lofi", "Lofi", 5400).with_music("/music/lofi", true);
            assert_eq!(
                Display::profile_line(&shuffled),
                "lofi            1:30:00  Lofi  ♪ shuffle /music/lofi"
            );

            let looped = Profile::new("rain", "Rain", 600).with_music("/music/rain.mp3", false);
            assert!(Display::profile_line(&looped).ends_with("  ♪ /music/rain.mp3"));
        }

        #[test]
        fn test_saved_at_formats_valid_timestamps() {
            assert!(Display::saved_at(1_700_000_000).is_some());
        }
    }

    // ------------------------------------------------------------------------
    // Display Output Tests
    // ------------------------------------------------------------------------

    mod display_tests {
        use super::*;
        use crate::types::TimerPhase;

        #[test]
        fn test_show_status_variants() {
            // This test verifies the functions don't panic
            let mut snapshot = SessionSnapshot::new("deep-work", 1500, 1200);
            snapshot.saved_at = 1_700_000_000;
            Display::show_status(Some(&snapshot));
            Display::show_status(None);

            let mut stats = Stats::default();
            stats.record_completion(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
            Display::show_stats(&stats, NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
            Display::show_progress(&stats);
        }

        #[test]
        fn test_show_profile_messages() {
            let profile = Profile::new("walk", "Walk", 900);
            Display::show_profiles(&crate::profile::default_profiles());
            Display::show_profile_saved(&profile);
            Display::show_profile_removed(&profile);
        }

        #[test]
        fn test_show_session_messages() {
            Display::show_session_started("deep-work", 1500, 1500);
            Display::show_session_started("deep-work", 1200, 1500);
            Display::show_countdown(1199, 1500);
            Display::show_completed("deep-work");
            Display::show_cleared();
            Display::show_warning("no audio device");
            Display::show_error("Test error message");
        }

        #[test]
        fn test_show_interrupted() {
            let status = TimerStatus {
                running: false,
                remaining_sec: 600,
                total_sec: 1500,
                profile_id: "deep-work".to_string(),
                phase: TimerPhase::Paused,
            };
            Display::show_interrupted(&status, true);
            Display::show_interrupted(&status, false);
        }
    }
}
