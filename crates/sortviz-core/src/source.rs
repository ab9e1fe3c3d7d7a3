#![forbid(unsafe_code)]

//! Step sources: how a run obtains its steps from an algorithm.
//!
//! An algorithm is a function from an owned array to a lazy, finite,
//! consume-once iterator of [`Step`]s. A [`StepSource`] wraps one invocation
//! in one of two modes:
//!
//! - **Precomputed**: the iterator is drained eagerly, bounded by a cap, so
//!   the total is known up front.
//! - **On-demand**: steps are pulled one at a time and the total stays
//!   unknown until exhaustion.
//!
//! When draining exceeds the cap, the partial buffer is discarded and the
//! algorithm is invoked again on a fresh copy of the input in on-demand mode.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, TraceError};
use crate::step::Step;

/// Default hard cap on eagerly drained steps.
pub const DEFAULT_PRECOMPUTE_CAP: usize = 10_000;

/// A lazy step sequence produced by one algorithm invocation.
pub type StepIter = Box<dyn Iterator<Item = Step> + Send>;

/// A sorting algorithm: owned input array in, lazy step sequence out.
pub type Algorithm = Arc<dyn Fn(Vec<i64>) -> StepIter + Send + Sync>;

/// Wrap a plain function or closure as an [`Algorithm`].
pub fn algorithm<F>(f: F) -> Algorithm
where
    F: Fn(Vec<i64>) -> StepIter + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Result of pulling from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pull {
    /// The next step in production order.
    Step(Step),
    /// No more steps. Not an error.
    Exhausted,
}

/// Which mode a source ended up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Precomputed,
    OnDemand,
}

enum Inner {
    Precomputed { steps: Vec<Step>, cursor: usize },
    OnDemand { iter: StepIter, exhausted: bool },
}

/// One run's supply of steps. Exactly one mode per run.
pub struct StepSource {
    inner: Inner,
}

impl fmt::Debug for StepSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Precomputed { steps, cursor } => f
                .debug_struct("StepSource::Precomputed")
                .field("total", &steps.len())
                .field("cursor", cursor)
                .finish(),
            Inner::OnDemand { exhausted, .. } => f
                .debug_struct("StepSource::OnDemand")
                .field("exhausted", exhausted)
                .finish(),
        }
    }
}

/// Drain `iter` fully, failing once more than `cap` steps are produced.
pub fn drain_capped(iter: impl Iterator<Item = Step>, cap: usize) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for step in iter {
        if steps.len() == cap {
            return Err(TraceError::CapacityExceeded { cap });
        }
        steps.push(step);
    }
    Ok(steps)
}

impl StepSource {
    /// Try to precompute up to `cap` steps; fall back to on-demand on overflow.
    #[must_use]
    pub fn precomputed(algorithm: &Algorithm, initial: &[i64], cap: usize) -> Self {
        match drain_capped(algorithm(initial.to_vec()), cap) {
            Ok(steps) => {
                tracing::debug!(total = steps.len(), "precomputed step source");
                Self::from_steps(steps)
            }
            Err(err) => {
                tracing::debug!(error = %err, "falling back to on-demand step source");
                Self::on_demand(algorithm, initial)
            }
        }
    }

    /// Pull lazily from a fresh invocation of `algorithm`.
    #[must_use]
    pub fn on_demand(algorithm: &Algorithm, initial: &[i64]) -> Self {
        Self {
            inner: Inner::OnDemand {
                iter: algorithm(initial.to_vec()),
                exhausted: false,
            },
        }
    }

    /// A precomputed source over an existing step list (e.g. a loaded trace).
    #[must_use]
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self {
            inner: Inner::Precomputed { steps, cursor: 0 },
        }
    }

    /// The mode this source runs in.
    #[must_use]
    pub fn mode(&self) -> SourceMode {
        match self.inner {
            Inner::Precomputed { .. } => SourceMode::Precomputed,
            Inner::OnDemand { .. } => SourceMode::OnDemand,
        }
    }

    /// Total step count when known.
    #[must_use]
    pub fn total(&self) -> Option<usize> {
        match &self.inner {
            Inner::Precomputed { steps, .. } => Some(steps.len()),
            Inner::OnDemand { .. } => None,
        }
    }

    /// Whether the last pull reported exhaustion (or nothing remains).
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        match &self.inner {
            Inner::Precomputed { steps, cursor } => *cursor >= steps.len(),
            Inner::OnDemand { exhausted, .. } => *exhausted,
        }
    }

    /// Take the next step.
    pub fn pull(&mut self) -> Pull {
        match &mut self.inner {
            Inner::Precomputed { steps, cursor } => match steps.get(*cursor) {
                Some(step) => {
                    *cursor += 1;
                    Pull::Step(step.clone())
                }
                None => Pull::Exhausted,
            },
            Inner::OnDemand { iter, exhausted } => {
                if *exhausted {
                    return Pull::Exhausted;
                }
                match iter.next() {
                    Some(step) => Pull::Step(step),
                    None => {
                        *exhausted = true;
                        Pull::Exhausted
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting(n: usize) -> Algorithm {
        algorithm(move |arr: Vec<i64>| {
            let len = arr.len().max(1);
            Box::new((0..n).map(move |i| Step::confirm(i % len))) as StepIter
        })
    }

    #[test]
    fn drain_respects_cap_boundary() {
        assert_eq!(drain_capped((0..3).map(Step::confirm), 3).unwrap().len(), 3);
        assert_eq!(
            drain_capped((0..4).map(Step::confirm), 3).unwrap_err(),
            TraceError::CapacityExceeded { cap: 3 }
        );
    }

    #[test]
    fn precomputed_knows_total() {
        let mut src = StepSource::precomputed(&counting(5), &[1, 2], 10);
        assert_eq!(src.mode(), SourceMode::Precomputed);
        assert_eq!(src.total(), Some(5));
        for _ in 0..5 {
            assert!(matches!(src.pull(), Pull::Step(_)));
        }
        assert_eq!(src.pull(), Pull::Exhausted);
        assert!(src.is_exhausted());
    }

    #[test]
    fn overflow_falls_back_to_on_demand_from_the_start() {
        let mut src = StepSource::precomputed(&counting(12), &[1, 2, 3], 10);
        assert_eq!(src.mode(), SourceMode::OnDemand);
        assert_eq!(src.total(), None);
        let mut pulled = 0;
        while let Pull::Step(_) = src.pull() {
            pulled += 1;
        }
        assert_eq!(pulled, 12);
        assert_eq!(src.pull(), Pull::Exhausted);
    }

    #[test]
    fn empty_algorithm_is_immediately_exhausted() {
        let mut src = StepSource::on_demand(&counting(0), &[]);
        assert!(!src.is_exhausted());
        assert_eq!(src.pull(), Pull::Exhausted);
        assert!(src.is_exhausted());
    }
}
