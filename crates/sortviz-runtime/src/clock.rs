#![forbid(unsafe_code)]

//! Monotonic time sources.
//!
//! Every time-dependent component reads the clock through [`Clock`], so tests
//! and headless runs can substitute a [`ManualClock`] and stay bit-for-bit
//! reproducible.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use web_time::Instant;

/// A monotonic clock measured from an arbitrary origin.
pub trait Clock: Send + Sync {
    /// Time since the clock's origin. Never decreases.
    fn now_mono(&self) -> Duration;
}

/// Clock shared between a pane and its host.
pub type SharedClock = Arc<dyn Clock>;

/// Real time, anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    #[must_use]
    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_mono(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Thread-safe so one instance can be shared (via [`Arc`]) by several panes
/// and the test driving them.
#[derive(Default)]
pub struct ManualClock {
    nanos: AtomicU64,
}

impl fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualClock")
            .field("now", &self.now_mono())
            .finish()
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(now: Duration) -> Self {
        let clock = Self::new();
        clock.set(now);
        clock
    }

    /// Jump to `now`. Earlier values are ignored to keep the clock monotonic.
    pub fn set(&self, now: Duration) {
        self.nanos.fetch_max(saturating_nanos(now), Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Duration) {
        let delta = saturating_nanos(delta);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(delta))
            });
    }
}

impl Clock for ManualClock {
    fn now_mono(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_never_rewinds() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_mono(), Duration::ZERO);
        clock.advance(Duration::from_millis(5));
        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now_mono(), Duration::from_millis(10));
        clock.set(Duration::from_millis(3));
        assert_eq!(clock.now_mono(), Duration::from_millis(10));
        clock.set(Duration::from_secs(1));
        assert_eq!(clock.now_mono(), Duration::from_secs(1));
    }

    #[test]
    fn manual_clock_saturates() {
        let clock = ManualClock::starting_at(Duration::from_nanos(u64::MAX - 1));
        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now_mono(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn monotonic_clock_is_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.now_mono();
        let b = clock.now_mono();
        assert!(b >= a);
    }

    #[test]
    fn shared_clock_is_object_safe() {
        let manual = Arc::new(ManualClock::new());
        let shared: SharedClock = manual.clone();
        manual.advance(Duration::from_millis(7));
        assert_eq!(shared.now_mono(), Duration::from_millis(7));
    }
}
