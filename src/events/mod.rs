//! Notification port between the engines and the UI layer.
//!
//! Engines never block on delivery: every [`EventSink`] implementation must
//! return promptly, and delivery failures are dropped.

use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::Event;

/// Fire-and-forget notification channel.
pub trait EventSink: Send + Sync {
    /// Emits an event. Must not block the caller indefinitely.
    fn emit(&self, event: Event);
}

/// Forwards events into an unbounded Tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelEventSink {
    /// Creates a sink together with the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: Event) {
        if let Err(e) = self.tx.send(event) {
            debug!("Event receiver dropped, discarding {}", e.0.name());
        }
    }
}

/// Logs every event at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: Event) {
        debug!(event = event.name(), payload = %event.payload(), "emit");
    }
}

/// Mock event sink for testing.
#[derive(Debug, Default)]
pub struct MockEventSink {
    events: Mutex<Vec<Event>>,
}

impl MockEventSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the recorded events with the given wire name.
    #[must_use]
    pub fn events_named(&self, name: &str) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name() == name)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for MockEventSink {
    fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}
