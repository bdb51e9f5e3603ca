//! Completed-session counts and the daily streak.
//!
//! `stats.json` holds today's count of completed sessions and the number of
//! consecutive days with at least one completion. Days are local calendar
//! dates; the count resets when the date changes.

mod error;

pub use error::StatsError;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::session::write_atomic;

/// File name of the stats record inside the data directory.
pub const STATS_FILE_NAME: &str = "stats.json";

/// Today's local calendar date.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Stats
// ============================================================================

/// Daily session count and streak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Day `sessions_today` belongs to.
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub sessions_today: u32,
    /// Most recent day with a completed session.
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub last_active_date: Option<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
}

fn empty_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.is_empty() => s.parse().map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl Stats {
    /// Moves the record to `today`, zeroing the count if the day changed.
    /// Returns true if anything changed.
    pub fn rollover(&mut self, today: NaiveDate) -> bool {
        if self.date == Some(today) {
            return false;
        }
        self.date = Some(today);
        self.sessions_today = 0;
        true
    }

    /// Counts one completed session on `today` and updates the streak.
    pub fn record_completion(&mut self, today: NaiveDate) {
        self.rollover(today);
        self.sessions_today += 1;

        self.streak = match self.last_active_date {
            None => 1,
            Some(last) if last == today => self.streak.max(1),
            Some(last) if Some(last) == today.pred_opt() => self.streak + 1,
            Some(_) => 1,
        };
        self.last_active_date = Some(today);
    }

    /// The streak as of `today`: zero once a whole day has passed without a
    /// completed session.
    #[must_use]
    pub fn active_streak(&self, today: NaiveDate) -> u32 {
        match self.last_active_date {
            Some(last) if last == today || Some(last) == today.pred_opt() => self.streak,
            _ => 0,
        }
    }
}

// ============================================================================
// StatsStore
// ============================================================================

/// Reads and writes `stats.json`.
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    /// Creates a store that keeps its record under `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATS_FILE_NAME),
        }
    }

    /// Returns the record path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stats rolled over to `today`.
    ///
    /// A missing or malformed file reads as empty stats.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self, today: NaiveDate) -> Result<Stats, StatsError> {
        let mut stats = self.read()?;
        stats.rollover(today);
        Ok(stats)
    }

    /// Records one completed session on `today` and returns the new stats.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or written.
    pub fn record_completion(&self, today: NaiveDate) -> Result<Stats, StatsError> {
        let mut stats = self.read()?;
        stats.record_completion(today);

        let data = serde_json::to_vec_pretty(&stats)?;
        write_atomic(&self.path, &data)?;
        debug!(
            "Recorded completion: {} today, streak {}",
            stats.sessions_today, stats.streak
        );
        Ok(stats)
    }

    fn read(&self) -> Result<Stats, StatsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Stats::default()),
            Err(source) => {
                return Err(StatsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring malformed stats file {}: {}", self.path.display(), e);
            Stats::default()
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
