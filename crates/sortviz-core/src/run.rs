#![forbid(unsafe_code)]

//! Mutable state of one visualized run.
//!
//! [`RunState`] owns the working array, the append-only step log, the
//! checkpoint store and the step source. It is the only place where steps
//! are applied, so metrics, highlights and checkpoints always agree with the
//! array.
//!
//! # Invariants
//!
//! 1. `step_index() <= log().len()`; the array equals
//!    `replay(initial, log[..step_index])`.
//! 2. A step enters the log only after it applied successfully.
//! 3. Checkpoints are taken when the log length reaches a stride multiple.
//! 4. Once a step fails, forward movement past the log returns that error
//!    until a fresh run is built.

use std::fmt;

use crate::checkpoint::CheckpointStore;
use crate::error::{Result, TraceError};
use crate::replay::apply_step;
use crate::source::{Algorithm, Pull, SourceMode, StepSource};
use crate::step::{Op, Step};

// ---------------------------------------------------------------------------
// Metrics & highlights
// ---------------------------------------------------------------------------

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub comparisons: u64,
    pub swaps: u64,
}

impl Metrics {
    /// Count `op` into the totals.
    pub fn record(&mut self, op: Op) {
        if op.is_comparison() {
            self.comparisons += 1;
        } else if op == Op::Swap {
            self.swaps += 1;
        }
    }
}

/// Highlight categories a renderer can color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Compare,
    Swap,
    Pivot,
    Merge,
    Key,
    Shift,
}

impl HighlightKind {
    pub const ALL: [Self; 6] = [
        Self::Compare,
        Self::Swap,
        Self::Pivot,
        Self::Merge,
        Self::Key,
        Self::Shift,
    ];
}

/// Indices active under each highlight category.
///
/// A highlight stays visible until a later step replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlights {
    compare: Vec<usize>,
    swap: Vec<usize>,
    pivot: Vec<usize>,
    merge: Vec<usize>,
    key: Vec<usize>,
    shift: Vec<usize>,
}

impl Highlights {
    /// Indices under `kind`.
    #[must_use]
    pub fn get(&self, kind: HighlightKind) -> &[usize] {
        match kind {
            HighlightKind::Compare => &self.compare,
            HighlightKind::Swap => &self.swap,
            HighlightKind::Pivot => &self.pivot,
            HighlightKind::Merge => &self.merge,
            HighlightKind::Key => &self.key,
            HighlightKind::Shift => &self.shift,
        }
    }

    /// Clear every category.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Update categories for an applied step.
    pub fn record(&mut self, step: &Step) {
        let idx = step.indices();
        match step.op() {
            Op::Compare => self.compare = idx.to_vec(),
            Op::Swap => {
                self.swap = idx.to_vec();
                self.shift.clear();
            }
            Op::Pivot => self.pivot = idx.to_vec(),
            Op::MergeMark => {
                if let &[lo, hi] = idx {
                    self.merge = (lo..=hi).collect();
                }
            }
            Op::MergeCompare => {
                self.compare = idx.to_vec();
                self.merge = step
                    .int_payload()
                    .and_then(|d| usize::try_from(d).ok())
                    .map(|d| vec![d])
                    .unwrap_or_default();
            }
            Op::Set => {
                self.merge = idx.to_vec();
                self.shift.clear();
            }
            Op::Shift => {
                self.shift = idx.to_vec();
                self.merge.clear();
            }
            Op::Key => self.key = idx.to_vec(),
            Op::Confirm | Op::Note => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Forward result
// ---------------------------------------------------------------------------

/// Outcome of [`RunState::forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A step was applied; the new step index.
    Applied(usize),
    /// Nothing left to apply.
    Exhausted,
}

/// Parameters fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub checkpoint_stride: usize,
    pub precompute_cap: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            checkpoint_stride: crate::checkpoint::DEFAULT_CHECKPOINT_STRIDE,
            precompute_cap: crate::source::DEFAULT_PRECOMPUTE_CAP,
        }
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Array, step log, checkpoints and derived view state for one run.
pub struct RunState {
    initial: Vec<i64>,
    array: Vec<i64>,
    log: Vec<Step>,
    checkpoints: CheckpointStore,
    source: StepSource,
    step_index: usize,
    metrics: Metrics,
    highlights: Highlights,
    narration: String,
    total: Option<usize>,
    finished: bool,
    /// Number of indices revealed by the completion sweep; `None` when no
    /// sweep has started.
    confirmed: Option<usize>,
    fault: Option<TraceError>,
}

impl fmt::Debug for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunState")
            .field("len", &self.array.len())
            .field("step_index", &self.step_index)
            .field("logged", &self.log.len())
            .field("total", &self.total)
            .field("metrics", &self.metrics)
            .field("mode", &self.source.mode())
            .field("finished", &self.finished)
            .field("fault", &self.fault)
            .finish()
    }
}

impl RunState {
    /// Start a run over `initial` with an already-built source.
    #[must_use]
    pub fn new(initial: Vec<i64>, source: StepSource, checkpoint_stride: usize) -> Self {
        let total = source.total();
        Self {
            checkpoints: CheckpointStore::new(&initial, checkpoint_stride),
            array: initial.clone(),
            initial,
            log: Vec::new(),
            source,
            step_index: 0,
            metrics: Metrics::default(),
            highlights: Highlights::default(),
            narration: String::new(),
            total,
            finished: false,
            confirmed: None,
            fault: None,
        }
    }

    /// Invoke `algorithm` on a copy of `initial`, precomputing when possible.
    #[must_use]
    pub fn prime(algorithm: &Algorithm, initial: Vec<i64>, config: RunConfig) -> Self {
        let source = StepSource::precomputed(algorithm, &initial, config.precompute_cap);
        tracing::debug!(
            len = initial.len(),
            mode = ?source.mode(),
            total = ?source.total(),
            "primed run"
        );
        Self::new(initial, source, config.checkpoint_stride)
    }

    // --- accessors ---------------------------------------------------------

    #[must_use]
    pub fn array(&self) -> &[i64] {
        &self.array
    }

    #[must_use]
    pub fn initial(&self) -> &[i64] {
        &self.initial
    }

    /// Every step applied so far, in production order.
    #[must_use]
    pub fn log(&self) -> &[Step] {
        &self.log
    }

    #[must_use]
    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    /// Number of steps reflected in the array.
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Total step count, once known.
    #[must_use]
    pub fn total(&self) -> Option<usize> {
        self.total
    }

    #[must_use]
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    #[must_use]
    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    /// Narration of the most recently applied step.
    #[must_use]
    pub fn narration(&self) -> &str {
        &self.narration
    }

    #[must_use]
    pub fn source_mode(&self) -> SourceMode {
        self.source.mode()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The error that stopped this run, if any.
    #[must_use]
    pub fn fault(&self) -> Option<&TraceError> {
        self.fault.as_ref()
    }

    /// Indices revealed as final by the completion sweep.
    #[must_use]
    pub fn confirmed(&self) -> std::ops::Range<usize> {
        0..self.confirmed.unwrap_or(0)
    }

    /// Whether the completion sweep still has indices to reveal.
    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        self.confirmed.is_some_and(|n| n < self.array.len())
    }

    // --- movement ----------------------------------------------------------

    /// Move one step forward: re-apply from the log if behind, otherwise
    /// pull a new step from the source.
    pub fn forward(&mut self) -> Result<Advance> {
        if self.step_index < self.log.len() {
            let target = self.step_index + 1;
            self.seek(target)?;
            return Ok(Advance::Applied(target));
        }
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        match self.source.pull() {
            Pull::Step(step) => {
                self.process(step)?;
                Ok(Advance::Applied(self.step_index))
            }
            Pull::Exhausted => {
                if self.total.is_none() {
                    self.total = Some(self.log.len());
                }
                Ok(Advance::Exhausted)
            }
        }
    }

    /// Move one step back. Returns `false` at index 0.
    pub fn back(&mut self) -> Result<bool> {
        if self.step_index == 0 {
            return Ok(false);
        }
        self.seek(self.step_index - 1)?;
        Ok(true)
    }

    /// Restore the state after `target` steps, clamped to the log length.
    ///
    /// Highlights and narration come out as they were when the run first
    /// passed `target`. Returns the index actually reached.
    pub fn seek(&mut self, target: usize) -> Result<usize> {
        let target = target.min(self.log.len());
        let ck = self.checkpoints.at_or_before(target);
        let (from, comparisons, swaps) = (ck.step_index, ck.comparisons, ck.swaps);
        self.array.clear();
        self.array.extend_from_slice(&ck.array);
        self.metrics = Metrics { comparisons, swaps };
        self.highlights.clone_from(&ck.highlights);
        self.narration.clear();
        self.narration.push_str(&ck.narration);
        self.confirmed = None;

        for i in from..target {
            let step = &self.log[i];
            self.narration = step.narrate(&self.array);
            apply_step(&mut self.array, step)?;
            self.metrics.record(step.op());
            self.highlights.record(step);
        }
        self.step_index = target;
        if self.finished && target == self.log.len() {
            // Back at the end of a completed run: show it fully confirmed.
            self.confirmed = Some(self.array.len());
        }
        tracing::trace!(requested = target, from_checkpoint = from, "seek");
        Ok(target)
    }

    /// Record completion and start the confirm sweep. Idempotent.
    pub fn finish(&mut self) {
        if self.total.is_none() {
            self.total = Some(self.log.len());
        }
        if self.finished {
            return;
        }
        self.finished = true;
        self.confirmed = Some(0);
        self.narration = "Sort complete. Finalizing display…".to_string();
        tracing::debug!(
            steps = self.log.len(),
            comparisons = self.metrics.comparisons,
            swaps = self.metrics.swaps,
            "run finished"
        );
    }

    /// Reveal one more confirmed index. Returns `false` once the sweep is done.
    pub fn advance_sweep(&mut self) -> bool {
        match self.confirmed {
            Some(n) if n < self.array.len() => {
                self.confirmed = Some(n + 1);
                if n + 1 == self.array.len() {
                    self.narration = "Array sorted!".to_string();
                }
                true
            }
            _ => false,
        }
    }

    /// Clear the finished flag after moving back from the end.
    pub fn reopen(&mut self) {
        self.finished = false;
        self.confirmed = None;
    }

    fn process(&mut self, step: Step) -> Result<()> {
        let narration = step.narrate(&self.array);
        if let Err(err) = apply_step(&mut self.array, &step) {
            tracing::warn!(
                step_index = self.step_index,
                op = %step.op(),
                error = %err,
                "step failed; run aborted"
            );
            self.fault = Some(err.clone());
            return Err(err);
        }
        self.metrics.record(step.op());
        self.highlights.record(&step);
        self.narration = narration;
        self.log.push(step);
        self.step_index = self.log.len();
        if self.checkpoints.is_due(self.step_index) {
            self.checkpoints.append(
                self.step_index,
                &self.array,
                self.metrics.comparisons,
                self.metrics.swaps,
                &self.highlights,
                &self.narration,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::replay;
    use crate::source::{StepIter, algorithm};

    fn fixed(steps: Vec<Step>) -> Algorithm {
        algorithm(move |_arr: Vec<i64>| Box::new(steps.clone().into_iter()) as StepIter)
    }

    fn bubble_trace() -> Vec<Step> {
        vec![
            Step::compare(0, 1),
            Step::swap_values(0, 1, 5, 3),
            Step::compare(1, 2),
            Step::swap_values(1, 2, 5, 1),
            Step::compare(2, 3),
            Step::swap_values(2, 3, 5, 4),
            Step::compare(0, 1),
            Step::swap_values(0, 1, 3, 1),
            Step::compare(1, 2),
        ]
    }

    fn run(stride: usize) -> RunState {
        RunState::prime(
            &fixed(bubble_trace()),
            vec![5, 3, 1, 4],
            RunConfig {
                checkpoint_stride: stride,
                precompute_cap: 100,
            },
        )
    }

    #[test]
    fn forward_to_exhaustion_sorts_and_counts() {
        let mut state = run(3);
        assert_eq!(state.total(), Some(9));
        let mut applied = 0;
        while let Advance::Applied(_) = state.forward().unwrap() {
            applied += 1;
        }
        assert_eq!(applied, 9);
        assert_eq!(state.array(), &[1, 3, 4, 5]);
        assert_eq!(
            state.metrics(),
            Metrics {
                comparisons: 5,
                swaps: 4
            }
        );
        assert_eq!(state.checkpoints().len(), 4);
    }

    #[test]
    fn seek_matches_replay_for_every_prefix() {
        for stride in [1, 2, 200] {
            let mut state = run(stride);
            while let Advance::Applied(_) = state.forward().unwrap() {}
            for k in 0..=9 {
                state.seek(k).unwrap();
                assert_eq!(
                    state.array(),
                    replay(&[5, 3, 1, 4], &bubble_trace()[..k]).unwrap().as_slice()
                );
                assert_eq!(state.step_index(), k);
            }
        }
    }

    #[test]
    fn seek_clamps_past_the_log() {
        let mut state = run(4);
        state.forward().unwrap();
        state.forward().unwrap();
        assert_eq!(state.seek(50).unwrap(), 2);
        assert_eq!(state.array(), &[3, 5, 1, 4]);
    }

    #[test]
    fn seek_zero_restores_initial_and_zero_metrics() {
        let mut state = run(200);
        for _ in 0..5 {
            state.forward().unwrap();
        }
        state.seek(0).unwrap();
        assert_eq!(state.array(), &[5, 3, 1, 4]);
        assert_eq!(state.metrics(), Metrics::default());
    }

    #[test]
    fn back_then_forward_replays_from_log() {
        let mut state = run(200);
        state.forward().unwrap();
        state.forward().unwrap();
        assert!(state.back().unwrap());
        assert_eq!(state.array(), &[5, 3, 1, 4]);
        assert_eq!(state.forward().unwrap(), Advance::Applied(2));
        assert_eq!(state.array(), &[3, 5, 1, 4]);
        assert_eq!(state.log().len(), 2);
    }

    #[test]
    fn back_at_zero_is_a_noop() {
        let mut state = run(200);
        assert!(!state.back().unwrap());
    }

    #[test]
    fn seek_shows_what_forward_play_showed() {
        let steps = vec![
            Step::pivot(3),
            Step::compare(0, 1),
            Step::swap(0, 1),
            Step::key(2, 3),
            Step::compare(1, 2),
            Step::compare(0, 1),
            Step::confirm(0),
        ];
        let mut state = RunState::prime(
            &fixed(steps),
            vec![4, 2, 3, 1],
            RunConfig {
                checkpoint_stride: 2,
                precompute_cap: 100,
            },
        );
        let mut seen = vec![(state.highlights().clone(), state.narration().to_string())];
        while let Advance::Applied(_) = state.forward().unwrap() {
            seen.push((state.highlights().clone(), state.narration().to_string()));
        }
        for (k, (highlights, narration)) in seen.iter().enumerate().rev() {
            state.seek(k).unwrap();
            assert_eq!(state.highlights(), highlights, "highlights at {k}");
            assert_eq!(state.narration(), narration, "narration at {k}");
        }
        state.seek(6).unwrap();
        assert_eq!(state.highlights().get(HighlightKind::Pivot), &[3]);
    }

    #[test]
    fn highlight_rules() {
        let mut h = Highlights::default();
        h.record(&Step::shift(2, 7));
        assert_eq!(h.get(HighlightKind::Shift), &[2]);
        h.record(&Step::swap(0, 1));
        assert!(h.get(HighlightKind::Shift).is_empty());
        h.record(&Step::merge_mark(1, 3));
        assert_eq!(h.get(HighlightKind::Merge), &[1, 2, 3]);
        h.record(&Step::merge_compare(1, 3, 1));
        assert_eq!(h.get(HighlightKind::Compare), &[1, 3]);
        assert_eq!(h.get(HighlightKind::Merge), &[1]);
        h.record(&Step::shift(0, 1));
        assert!(h.get(HighlightKind::Merge).is_empty());
    }

    #[test]
    fn failing_step_faults_the_run_without_mutation() {
        let steps = vec![
            Step::swap(0, 1),
            Step::new(Op::Set, &[0], None),
            Step::swap(0, 1),
        ];
        let mut state = RunState::prime(&fixed(steps), vec![1, 2], RunConfig::default());
        state.forward().unwrap();
        let err = state.forward().unwrap_err();
        assert!(matches!(err, TraceError::MalformedStep { .. }));
        assert_eq!(state.array(), &[2, 1]);
        assert_eq!(state.log().len(), 1);
        assert_eq!(state.forward().unwrap_err(), err);
        assert_eq!(state.fault(), Some(&err));
    }

    #[test]
    fn finish_runs_sweep_once() {
        let mut state = run(200);
        while let Advance::Applied(_) = state.forward().unwrap() {}
        state.finish();
        state.finish();
        assert!(state.is_sweeping());
        let mut ticks = 0;
        while state.advance_sweep() {
            ticks += 1;
        }
        assert_eq!(ticks, 4);
        assert_eq!(state.confirmed(), 0..4);
        assert_eq!(state.narration(), "Array sorted!");
    }
}
