#![forbid(unsafe_code)]

//! Periodic array snapshots for fast seeking.
//!
//! [`CheckpointStore`] keeps a copy of the array (plus metrics, highlights
//! and narration) every `stride` applied steps. Restoring index `k` means cloning the nearest
//! checkpoint at or before `k` and replaying at most `stride - 1` steps from
//! the log, so seek cost is bounded by the stride rather than the run length.
//!
//! ```text
//! log:         s0 s1 s2 s3 s4 s5 s6 s7 s8 s9 ...
//! checkpoints: C0       C3       C6       C9        (stride = 3)
//! seek(7):     restore C6, replay s6
//! ```
//!
//! # Invariants
//!
//! 1. Checkpoint 0 always exists and holds the initial array with zero metrics.
//! 2. Checkpoint indices are strictly increasing.
//! 3. A checkpoint is never modified after it is appended.

use std::fmt;
use std::sync::Arc;

use crate::run::Highlights;

/// Default number of applied steps between checkpoints.
pub const DEFAULT_CHECKPOINT_STRIDE: usize = 200;

/// Array snapshot taken after `step_index` steps were applied.
#[derive(Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub step_index: usize,
    pub array: Arc<[i64]>,
    pub comparisons: u64,
    pub swaps: u64,
    /// Highlights as they stood after `step_index` steps.
    pub highlights: Highlights,
    pub narration: Arc<str>,
}

impl fmt::Debug for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkpoint")
            .field("step_index", &self.step_index)
            .field("len", &self.array.len())
            .field("comparisons", &self.comparisons)
            .field("swaps", &self.swaps)
            .field("highlights", &self.highlights)
            .finish()
    }
}

/// Append-only, index-ordered list of checkpoints.
#[derive(Clone)]
pub struct CheckpointStore {
    checkpoints: Vec<Checkpoint>,
    stride: usize,
}

impl fmt::Debug for CheckpointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckpointStore")
            .field("count", &self.checkpoints.len())
            .field("stride", &self.stride)
            .field("last_index", &self.last().step_index)
            .finish()
    }
}

impl CheckpointStore {
    /// Create a store seeded with checkpoint 0 for `initial`.
    ///
    /// A stride of zero is treated as one.
    #[must_use]
    pub fn new(initial: &[i64], stride: usize) -> Self {
        Self {
            checkpoints: vec![Checkpoint {
                step_index: 0,
                array: Arc::from(initial),
                comparisons: 0,
                swaps: 0,
                highlights: Highlights::default(),
                narration: Arc::from(""),
            }],
            stride: stride.max(1),
        }
    }

    /// Steps between checkpoints.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of stored checkpoints (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    /// Always false; checkpoint 0 is permanent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// The most recent checkpoint.
    #[must_use]
    pub fn last(&self) -> &Checkpoint {
        // Checkpoint 0 is never removed.
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    /// Whether a checkpoint should be taken now that `applied` steps exist.
    #[must_use]
    pub fn is_due(&self, applied: usize) -> bool {
        applied > self.last().step_index && applied % self.stride == 0
    }

    /// Append a checkpoint. Returns `false` (and stores nothing) when
    /// `step_index` does not exceed the last stored index.
    pub fn append(
        &mut self,
        step_index: usize,
        array: &[i64],
        comparisons: u64,
        swaps: u64,
        highlights: &Highlights,
        narration: &str,
    ) -> bool {
        if step_index <= self.last().step_index {
            tracing::debug!(
                step_index,
                last = self.last().step_index,
                "rejected out-of-order checkpoint"
            );
            return false;
        }
        self.checkpoints.push(Checkpoint {
            step_index,
            array: Arc::from(array),
            comparisons,
            swaps,
            highlights: highlights.clone(),
            narration: Arc::from(narration),
        });
        true
    }

    /// The checkpoint with the greatest `step_index <= target`.
    #[must_use]
    pub fn at_or_before(&self, target: usize) -> &Checkpoint {
        // partition_point counts checkpoints with index <= target; at least
        // checkpoint 0 qualifies.
        let pos = self
            .checkpoints
            .partition_point(|c| c.step_index <= target);
        &self.checkpoints[pos.saturating_sub(1)]
    }

    /// Iterate checkpoints in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    /// Drop everything but checkpoint 0, re-seeded from `initial`.
    pub fn reset(&mut self, initial: &[i64]) {
        *self = Self::new(initial, self.stride);
    }
}
