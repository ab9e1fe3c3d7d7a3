#![forbid(unsafe_code)]

//! Playback notifications and observer registration.

use std::fmt;

use serde::Serialize;

/// Handle returned by [`Observers::subscribe`].
pub type SubscriptionId = u64;

/// Why playback is being throttled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackpressureReason {
    /// The rolling one-second window admitted its full quota.
    PerSecondCap,
}

impl BackpressureReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerSecondCap => "per_second_cap",
        }
    }
}

/// Backpressure transition. Emitted once on entry and once on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Backpressure {
    pub active: bool,
    pub reason: Option<BackpressureReason>,
    pub limit: Option<u32>,
}

impl Backpressure {
    #[must_use]
    pub const fn per_second_cap(limit: u32) -> Self {
        Self {
            active: true,
            reason: Some(BackpressureReason::PerSecondCap),
            limit: Some(limit),
        }
    }

    #[must_use]
    pub const fn cleared() -> Self {
        Self {
            active: false,
            reason: None,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// A step was applied; the new step index.
    Stepped(usize),
    Finished,
    Backpressure(Backpressure),
    /// Wall-clock seconds, excluding paused intervals.
    ElapsedUpdated(f64),
    /// Sum of nominal step durations.
    LogicalElapsedUpdated(f64),
}

type Callback = Box<dyn FnMut(&PlaybackEvent) + Send>;

/// Registered callbacks, invoked in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: SubscriptionId,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Observers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackEvent) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sub, _)| *sub != id);
        self.callbacks.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn emit(&mut self, event: &PlaybackEvent) {
        tracing::trace!(?event, observers = self.callbacks.len(), "emit");
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(observers: &mut Observers) -> (SubscriptionId, Arc<Mutex<Vec<PlaybackEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = observers.subscribe(move |e| sink.lock().unwrap().push(*e));
        (id, seen)
    }

    #[test]
    fn events_reach_every_subscriber_in_order() {
        let mut observers = Observers::new();
        let (_, a) = recorder(&mut observers);
        let (_, b) = recorder(&mut observers);
        observers.emit(&PlaybackEvent::Stepped(1));
        observers.emit(&PlaybackEvent::Finished);
        let expected = vec![PlaybackEvent::Stepped(1), PlaybackEvent::Finished];
        assert_eq!(*a.lock().unwrap(), expected);
        assert_eq!(*b.lock().unwrap(), expected);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut observers = Observers::new();
        let (id, seen) = recorder(&mut observers);
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.emit(&PlaybackEvent::Finished);
        assert!(seen.lock().unwrap().is_empty());
        assert!(observers.is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut observers = Observers::new();
        let first = observers.subscribe(|_| {});
        observers.unsubscribe(first);
        let second = observers.subscribe(|_| {});
        assert_ne!(first, second);
    }

    #[test]
    fn backpressure_serializes_with_reason_string() {
        let json = serde_json::to_string(&Backpressure::per_second_cap(5)).unwrap();
        assert_eq!(json, r#"{"active":true,"reason":"per_second_cap","limit":5}"#);
        assert_eq!(
            BackpressureReason::PerSecondCap.as_str(),
            "per_second_cap"
        );
    }
}
