#![forbid(unsafe_code)]

//! Periodic deadline tracking.
//!
//! The host owns the event loop; a [`Ticker`] only answers "is a tick due at
//! `now`" and "when is the next one". Missed periods are skipped rather than
//! replayed, so a stalled host does not trigger a burst of catch-up ticks.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Duration>,
}

impl Ticker {
    /// A stopped ticker. Zero intervals are raised to one millisecond.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    /// Ticker firing `hz` times per second (at least once).
    #[must_use]
    pub fn with_hz(hz: u32) -> Self {
        Self::new(Duration::from_millis(u64::from(1000 / hz.max(1))))
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arm the ticker; the first tick is due one interval after `now`.
    pub fn start(&mut self, now: Duration) {
        self.next_due = Some(now.saturating_add(self.interval));
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Change the period. An active ticker is re-armed from `now`.
    pub fn set_interval(&mut self, interval: Duration, now: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
        if self.is_active() {
            self.start(now);
        }
    }

    #[must_use]
    pub fn is_due(&self, now: Duration) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Consume the pending tick if one is due, scheduling the next deadline
    /// strictly after `now`.
    pub fn fire(&mut self, now: Duration) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let behind = now.saturating_sub(due);
        let skipped = behind.as_nanos() / self.interval.as_nanos();
        let periods = u32::try_from(skipped + 1).unwrap_or(u32::MAX);
        self.next_due = Some(due.saturating_add(self.interval.saturating_mul(periods)));
        true
    }

    #[must_use]
    pub const fn next_deadline(&self) -> Option<Duration> {
        self.next_due
    }
}
