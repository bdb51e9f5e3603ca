//! Foreground session runner.
//!
//! Wires a [`TimerEngine`] backed by the JSON session store and an optional
//! [`AudioEngine`] to one event channel, then renders events until the
//! countdown completes or the user presses Ctrl-C. A completed session is
//! counted in the daily stats.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use super::commands::{MusicArgs, StartArgs};
use super::display::Display;
use crate::audio::{try_create_output, AudioEngine};
use crate::config::{resolve_data_dir, Config};
use crate::events::{ChannelEventSink, EventSink};
use crate::profile::{Profile, ProfileStore};
use crate::session::{JsonSessionStore, SessionStore};
use crate::stats::{today, Stats, StatsStore};
use crate::timer::{TimerEngine, TICK_INTERVAL};
use crate::types::{Event, SessionSnapshot};

/// How a foreground session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The countdown reached zero.
    Completed,
    /// Ctrl-C paused the session; it was checkpointed if `saved`.
    Interrupted { saved: bool },
}

/// Music a session plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicPlan {
    pub path: PathBuf,
    pub shuffle: bool,
}

/// Picks the music for a session.
///
/// An explicit `--music` always plays. Music configured on the profile only
/// starts when `autoStartAudio` is on.
pub fn plan_music(
    music: &MusicArgs,
    profile: Option<&Profile>,
    auto_start_audio: bool,
) -> Option<MusicPlan> {
    if let Some(path) = &music.music {
        return Some(MusicPlan {
            path: path.clone(),
            shuffle: music.shuffle,
        });
    }

    let profile = profile?;
    let path = profile.music_path.as_ref()?;
    if !auto_start_audio {
        info!("Not starting music of profile {}: autoStartAudio is off", profile.id);
        return None;
    }
    Some(MusicPlan {
        path: path.clone(),
        shuffle: profile.shuffle,
    })
}

/// Picks the session length: `--minutes` if given, else the profile's.
///
/// # Errors
///
/// Returns an error if neither is available.
pub fn plan_duration(args: &StartArgs, profile: Option<&Profile>) -> Result<u32> {
    match (args.duration_override_sec(), profile) {
        (Some(duration), _) => Ok(duration),
        (None, Some(profile)) => Ok(profile.duration_sec),
        (None, None) => bail!(
            "unknown profile '{}'; pass --minutes or add it with `focusplay profiles add`",
            args.profile
        ),
    }
}

/// Resolved data directory, configuration and stores.
pub struct Context {
    pub data_dir: PathBuf,
    pub config: Config,
    store: Arc<JsonSessionStore>,
    profiles: ProfileStore,
    stats: StatsStore,
}

impl Context {
    /// Resolves the data directory and loads `config.json` from it.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined or the
    /// configuration file is malformed.
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir)?;
        let config = Config::load(&data_dir)
            .with_context(|| format!("failed to load configuration from {}", data_dir.display()))?;
        debug!("Using data directory {}", data_dir.display());

        Ok(Self {
            store: Arc::new(JsonSessionStore::new(&data_dir)),
            profiles: ProfileStore::new(&data_dir),
            stats: StatsStore::new(&data_dir),
            data_dir,
            config,
        })
    }

    /// The saved session, if one exists and is not stale.
    pub fn saved_session(&self) -> Option<SessionSnapshot> {
        self.store.load()
    }

    /// Deletes the saved session.
    pub fn clear_session(&self) {
        self.store.clear();
    }

    /// Every profile, seeding the defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if `profiles.json` cannot be read.
    pub fn profiles(&self) -> Result<Vec<Profile>> {
        self.profiles.load().context("failed to load profiles")
    }

    /// Adds or replaces a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is invalid or cannot be stored.
    pub fn save_profile(&self, profile: Profile) -> Result<()> {
        self.profiles
            .upsert(profile)
            .context("failed to save profile")
    }

    /// Removes a profile and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such profile or the list cannot be
    /// written.
    pub fn remove_profile(&self, id: &str) -> Result<Profile> {
        self.profiles
            .remove(id)
            .context("failed to remove profile")
    }

    /// Today's session count and streak.
    ///
    /// # Errors
    ///
    /// Returns an error if `stats.json` cannot be read.
    pub fn stats(&self) -> Result<Stats> {
        self.stats.load(today()).context("failed to load stats")
    }

    /// Runs a new session in the foreground.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown and `--minutes` is missing,
    /// or if the Ctrl-C handler cannot be installed.
    pub async fn start(&self, args: &StartArgs) -> Result<SessionEnd> {
        let profile = self.profiles.get(&args.profile).context("failed to load profiles")?;
        let duration = plan_duration(args, profile.as_ref())?;
        let music = plan_music(&args.music, profile.as_ref(), self.config.auto_start_audio);

        let snapshot = SessionSnapshot::new(args.profile.clone(), duration, duration);
        self.run(
            music,
            args.music.volume,
            |timer| timer.start(args.profile.clone(), duration),
            &snapshot,
        )
        .await
    }

    /// Continues the saved session in the foreground, with the music of its
    /// profile unless `--music` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no saved session to resume.
    pub async fn resume(&self, music: &MusicArgs) -> Result<SessionEnd> {
        let Some(snapshot) = self.saved_session() else {
            bail!("no saved session to resume");
        };
        let profile = self.profiles.get(&snapshot.profile_id).unwrap_or_else(|e| {
            warn!("Resuming without profile settings: {}", e);
            None
        });
        let plan = plan_music(music, profile.as_ref(), self.config.auto_start_audio);

        self.run(plan, music.volume, |timer| timer.resume(&snapshot), &snapshot)
            .await
    }

    async fn run(
        &self,
        music: Option<MusicPlan>,
        volume: Option<i32>,
        begin: impl FnOnce(&TimerEngine),
        snapshot: &SessionSnapshot,
    ) -> Result<SessionEnd> {
        let (sink, events) = ChannelEventSink::new();
        let sink: Arc<dyn EventSink> = Arc::new(sink);

        let timer = TimerEngine::with_intervals(
            Arc::clone(&self.store) as Arc<dyn SessionStore>,
            Arc::clone(&sink),
            TICK_INTERVAL,
            self.config.autosave_interval(),
        );
        let audio = music.and_then(|plan| self.start_audio(&plan, volume, Arc::clone(&sink)));

        Display::show_session_started(
            &snapshot.profile_id,
            snapshot.remaining_sec.min(snapshot.total_sec),
            snapshot.total_sec,
        );
        begin(&timer);

        let end = drive(&timer, events).await?;
        if let Some(audio) = &audio {
            audio.stop();
        }
        if end == SessionEnd::Completed {
            self.record_completion();
        }
        Ok(end)
    }

    fn record_completion(&self) {
        match self.stats.record_completion(today()) {
            Ok(stats) => Display::show_progress(&stats),
            Err(e) => {
                warn!("Failed to record completed session: {}", e);
                Display::show_warning("could not update session stats");
            }
        }
    }

    fn start_audio(
        &self,
        plan: &MusicPlan,
        volume: Option<i32>,
        sink: Arc<dyn EventSink>,
    ) -> Option<AudioEngine> {
        let Some(output) = try_create_output() else {
            Display::show_warning("no audio device available, continuing without music");
            return None;
        };

        let engine = AudioEngine::new(output, sink);
        engine.set_volume(volume.unwrap_or(self.config.default_volume));
        if plan.shuffle {
            engine.play_shuffle_folder(&plan.path);
        } else {
            engine.play_looping(&plan.path);
        }
        Some(engine)
    }
}

/// Renders events until the run completes or Ctrl-C arrives.
async fn drive(timer: &TimerEngine, mut events: UnboundedReceiver<Event>) -> Result<SessionEnd> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                timer.pause();
                let saved = match timer.checkpoint() {
                    Ok(saved) => saved,
                    Err(e) => {
                        warn!("Failed to save session: {}", e);
                        false
                    }
                };
                Display::show_interrupted(&timer.get_state(), saved);
                return Ok(SessionEnd::Interrupted { saved });
            }

            event = events.recv() => match event {
                Some(Event::TimerTicked { remaining_sec, .. }) => {
                    Display::show_countdown(remaining_sec, timer.get_state().total_sec);
                }
                Some(Event::TimerCompleted { profile_id }) => {
                    Display::show_completed(&profile_id);
                    return Ok(SessionEnd::Completed);
                }
                Some(Event::AudioStateChanged(status)) => Display::show_audio(&status),
                None => bail!("event channel closed"),
            }
        }
    }
}
