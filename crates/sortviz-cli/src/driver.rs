#![forbid(unsafe_code)]

//! Host loop: wait for the next deadline, poll, repeat.
//!
//! The runtime never sleeps on its own. [`Pacing::Simulated`] jumps a
//! [`ManualClock`] straight to each deadline, so a run finishes as fast as
//! the steps can be applied while still accumulating the same logical
//! time. [`Pacing::Realtime`] sleeps on the wall clock.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sortviz_core::TraceError;
use sortviz_runtime::{Clock, CompareController, ManualClock, MonotonicClock, Pane, SharedClock};

#[derive(Debug, Clone)]
pub enum Pacing {
    Simulated(Arc<ManualClock>),
    Realtime(Arc<MonotonicClock>),
}

impl Pacing {
    #[must_use]
    pub fn new(realtime: bool) -> Self {
        if realtime {
            Self::Realtime(Arc::new(MonotonicClock::new()))
        } else {
            Self::Simulated(Arc::new(ManualClock::new()))
        }
    }

    #[must_use]
    pub fn clock(&self) -> SharedClock {
        match self {
            Self::Simulated(clock) => clock.clone(),
            Self::Realtime(clock) => clock.clone(),
        }
    }

    #[must_use]
    pub fn is_realtime(&self) -> bool {
        matches!(self, Self::Realtime(_))
    }

    fn wait_until(&self, deadline: Duration) {
        match self {
            Self::Simulated(clock) => clock.set(deadline),
            Self::Realtime(clock) => {
                let now = clock.now_mono();
                if deadline > now {
                    thread::sleep(deadline - now);
                }
            }
        }
    }
}

/// Something with deadlines that advances when polled.
pub trait Drive {
    fn next_deadline(&self) -> Option<Duration>;

    /// Returns the number of steps applied.
    fn poll_once(&mut self) -> Result<usize, TraceError>;
}

impl Drive for Pane {
    fn next_deadline(&self) -> Option<Duration> {
        Pane::next_deadline(self)
    }

    fn poll_once(&mut self) -> Result<usize, TraceError> {
        self.poll()
    }
}

impl Drive for CompareController {
    fn next_deadline(&self) -> Option<Duration> {
        CompareController::next_deadline(self)
    }

    fn poll_once(&mut self) -> Result<usize, TraceError> {
        let applied = self.poll();
        Ok(applied.left? + applied.right?)
    }
}

/// Poll `target` until it has no deadline left. Returns the poll count.
pub fn drive(target: &mut impl Drive, pacing: &Pacing) -> Result<u64, TraceError> {
    let mut polls = 0u64;
    while let Some(deadline) = target.next_deadline() {
        pacing.wait_until(deadline);
        target.poll_once()?;
        polls += 1;
    }
    tracing::debug!(polls, realtime = pacing.is_realtime(), "drive complete");
    Ok(polls)
}
