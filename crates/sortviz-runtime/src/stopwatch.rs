#![forbid(unsafe_code)]

//! Pausable wall-clock stopwatch.
//!
//! Unlike a tick-driven stopwatch, this one never owns time: every operation
//! takes the current reading of a [`Clock`](crate::clock::Clock), so paused
//! intervals are excluded exactly and tests can drive it with a manual clock.
//!
//! # Example
//! ```
//! use sortviz_runtime::stopwatch::Stopwatch;
//! use std::time::Duration;
//!
//! let mut sw = Stopwatch::new();
//! sw.start(Duration::from_secs(1));
//! sw.pause(Duration::from_secs(3));
//! sw.start(Duration::from_secs(10));
//! assert_eq!(sw.elapsed(Duration::from_secs(11)), Duration::from_secs(3));
//! ```

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stopwatch {
    /// Time banked by completed running intervals.
    banked: Duration,
    /// Start of the current running interval.
    started_at: Option<Duration>,
}

impl Stopwatch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            banked: Duration::ZERO,
            started_at: None,
        }
    }

    #[must_use]
    pub const fn running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Begin (or resume) timing at `now`. No-op while running.
    pub fn start(&mut self, now: Duration) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Bank the running interval ending at `now`. No-op while paused.
    pub fn pause(&mut self, now: Duration) {
        if let Some(start) = self.started_at.take() {
            self.banked = self.banked.saturating_add(now.saturating_sub(start));
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Total running time as of `now`.
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.started_at {
            Some(start) => self.banked.saturating_add(now.saturating_sub(start)),
            None => self.banked,
        }
    }
}

/// Render a duration as `mm:ss.mmm`, or `h:mm:ss.mmm` past the hour.
#[must_use]
pub fn format_clock(d: Duration) -> String {
    let secs = d.as_secs();
    let millis = d.subsec_millis();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{seconds:02}.{millis:03}")
    }
}

/// Render fractional seconds with millisecond precision, e.g. `1.250s`.
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    if seconds.is_finite() {
        format!("{:.3}s", seconds.max(0.0))
    } else {
        "--".to_string()
    }
}
