//! Countdown timer engine.
//!
//! This module provides the core timer functionality:
//! - State transitions (Idle → Running ⇄ Paused → Completed / Stopped)
//! - Countdown with tokio::time::interval
//! - Periodic autosave of the session record
//! - Tick and completion notifications
//!
//! Each run is one background task selecting between a tick, an autosave and
//! its cancellation token. Starting a new run cancels the previous one without
//! waiting for it to exit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::EventSink;
use crate::session::{SessionError, SessionStore};
use crate::types::{Event, SessionSnapshot, TimerPhase, TimerStatus};

/// Countdown resolution.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Cadence of session autosaves while running.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// TimerRunState
// ============================================================================

/// In-memory run state. Only touched under the engine lock.
#[derive(Debug, Default)]
struct TimerRunState {
    phase: TimerPhase,
    total_sec: u32,
    remaining_sec: u32,
    profile_id: String,
    cancel: Option<CancellationToken>,
}

impl TimerRunState {
    /// Installs a new run, cancelling whichever run was active.
    fn begin(&mut self, profile_id: String, total_sec: u32, remaining_sec: u32, token: CancellationToken) {
        if let Some(previous) = self.cancel.replace(token) {
            previous.cancel();
        }
        self.phase = TimerPhase::Running;
        self.profile_id = profile_id;
        self.total_sec = total_sec;
        self.remaining_sec = remaining_sec;
    }

    /// Cancels the active run, if any.
    fn cancel_run(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }

    fn status(&self) -> TimerStatus {
        TimerStatus {
            running: self.phase.is_active(),
            remaining_sec: self.remaining_sec,
            total_sec: self.total_sec,
            profile_id: self.profile_id.clone(),
            phase: self.phase,
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.profile_id.clone(), self.total_sec, self.remaining_sec)
    }
}

/// Result of applying one tick under the lock.
enum TickOutcome {
    Ticked { remaining_sec: u32, profile_id: String },
    Completed { profile_id: String },
    Cancelled,
}

// ============================================================================
// TimerShared
// ============================================================================

/// State shared between the engine handle and its background run.
///
/// Lock order: `persist` before `state`. `stop` releases `state` before
/// taking `persist`.
struct TimerShared {
    state: Mutex<TimerRunState>,
    /// Serializes store writes against `stop`'s clear.
    persist: Mutex<()>,
    store: Arc<dyn SessionStore>,
    sink: Arc<dyn EventSink>,
    tick_interval: Duration,
    autosave_interval: Duration,
}

impl TimerShared {
    fn lock(&self) -> MutexGuard<'_, TimerRunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self, token: &CancellationToken) -> TickOutcome {
        let mut state = self.lock();
        if token.is_cancelled() {
            return TickOutcome::Cancelled;
        }

        if state.remaining_sec > 0 {
            state.remaining_sec -= 1;
            TickOutcome::Ticked {
                remaining_sec: state.remaining_sec,
                profile_id: state.profile_id.clone(),
            }
        } else {
            state.phase = TimerPhase::Completed;
            state.cancel = None;
            TickOutcome::Completed {
                profile_id: state.profile_id.clone(),
            }
        }
    }

    fn persist_guard(&self) -> MutexGuard<'_, ()> {
        self.persist.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes the run's snapshot. Returns false if the run was cancelled.
    fn autosave(&self, token: &CancellationToken) -> bool {
        let _persist = self.persist_guard();
        let snapshot = {
            let state = self.lock();
            if token.is_cancelled() {
                return false;
            }
            state.snapshot()
        };
        match self.store.save(snapshot) {
            Ok(()) => debug!("Autosaved session"),
            Err(e) => warn!("Autosave failed, continuing: {}", e),
        }
        true
    }

    fn clear_store(&self) {
        let _persist = self.persist_guard();
        self.store.clear();
    }

    fn emit_unless_cancelled(&self, token: &CancellationToken, event: Event) {
        if token.is_cancelled() {
            debug!("Dropping {} from a cancelled run", event.name());
            return;
        }
        self.sink.emit(event);
    }
}

/// Background task for one run.
async fn run(shared: Arc<TimerShared>, token: CancellationToken) {
    let start = Instant::now();
    let mut ticker = interval_at(start + shared.tick_interval, shared.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut autosave = interval_at(start + shared.autosave_interval, shared.autosave_interval);
    autosave.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                debug!("Timer run cancelled");
                return;
            }

            _ = ticker.tick() => match shared.tick(&token) {
                TickOutcome::Ticked { remaining_sec, profile_id } => {
                    shared.emit_unless_cancelled(
                        &token,
                        Event::TimerTicked { remaining_sec, profile_id },
                    );
                }
                TickOutcome::Completed { profile_id } => {
                    info!("Session {} completed", profile_id);
                    shared.clear_store();
                    shared.sink.emit(Event::TimerCompleted { profile_id });
                    return;
                }
                TickOutcome::Cancelled => return,
            },

            _ = autosave.tick() => {
                if !shared.autosave(&token) {
                    return;
                }
            }
        }
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the countdown state and its background run.
///
/// At most one run is alive at a time. All operations are non-blocking and
/// must be called from within a Tokio runtime. Dropping the engine cancels
/// the active run.
pub struct TimerEngine {
    shared: Arc<TimerShared>,
}

impl TimerEngine {
    /// Creates an idle engine with the default tick and autosave cadence.
    pub fn new(store: Arc<dyn SessionStore>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_intervals(store, sink, TICK_INTERVAL, AUTOSAVE_INTERVAL)
    }

    /// Creates an idle engine with a custom cadence.
    pub fn with_intervals(
        store: Arc<dyn SessionStore>,
        sink: Arc<dyn EventSink>,
        tick_interval: Duration,
        autosave_interval: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(TimerShared {
                state: Mutex::new(TimerRunState::default()),
                persist: Mutex::new(()),
                store,
                sink,
                tick_interval,
                autosave_interval,
            }),
        }
    }

    /// Starts a new countdown of `duration_sec` seconds.
    ///
    /// Supersedes any active run. A zero duration completes on the first tick.
    pub fn start(&self, profile_id: impl Into<String>, duration_sec: u32) {
        let profile_id = profile_id.into();
        info!("Starting session {} for {}s", profile_id, duration_sec);
        self.begin(profile_id, duration_sec, duration_sec);
    }

    /// Continues a countdown from a saved snapshot.
    ///
    /// `remaining_sec` is clamped to `total_sec`.
    pub fn resume(&self, snapshot: &SessionSnapshot) {
        let remaining_sec = snapshot.remaining_sec.min(snapshot.total_sec);
        info!(
            "Resuming session {} with {}s of {}s left",
            snapshot.profile_id, remaining_sec, snapshot.total_sec
        );
        self.begin(snapshot.profile_id.clone(), snapshot.total_sec, remaining_sec);
    }

    /// Pauses a running countdown, keeping the remaining time.
    ///
    /// Does nothing unless the timer is running.
    pub fn pause(&self) {
        let mut state = self.shared.lock();
        if state.phase != TimerPhase::Running {
            debug!("Pause ignored in phase {}", state.phase.as_str());
            return;
        }
        state.cancel_run();
        state.phase = TimerPhase::Paused;
        info!("Paused with {}s left", state.remaining_sec);
    }

    /// Stops the countdown, resets the remaining time and deletes the
    /// durable snapshot.
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock();
            state.cancel_run();
            state.phase = TimerPhase::Stopped;
            state.remaining_sec = state.total_sec;
        }
        // Waits out an autosave that passed its cancellation check.
        self.shared.clear_store();
        info!("Timer stopped");
    }

    /// Returns a consistent view of the timer.
    pub fn get_state(&self) -> TimerStatus {
        self.shared.lock().status()
    }

    /// Returns the current phase.
    pub fn phase(&self) -> TimerPhase {
        self.shared.lock().phase
    }

    /// Writes the current session to the store right away.
    ///
    /// Returns `Ok(false)` without writing when no session is running or paused.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub fn checkpoint(&self) -> Result<bool, SessionError> {
        let _persist = self.shared.persist_guard();
        let snapshot = {
            let state = self.shared.lock();
            if !state.phase.has_session() {
                return Ok(false);
            }
            state.snapshot()
        };
        self.shared.store.save(snapshot)?;
        Ok(true)
    }

    fn begin(&self, profile_id: String, total_sec: u32, remaining_sec: u32) {
        let token = CancellationToken::new();
        self.shared
            .lock()
            .begin(profile_id, total_sec, remaining_sec, token.clone());
        tokio::spawn(run(Arc::clone(&self.shared), token));
    }
}

impl Drop for TimerEngine {
    fn drop(&mut self) {
        self.shared.lock().cancel_run();
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.get_state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
