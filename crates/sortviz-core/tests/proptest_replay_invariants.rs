#![forbid(unsafe_code)]

//! Property tests for replay, checkpoints and seeking.
//!
//! Validates:
//! - Replay is deterministic and never touches its inputs.
//! - Seeking to any index equals a fresh replay of that prefix, for any stride.
//! - Stepping back after stepping forward restores array and metrics exactly.
//! - Checkpoint indices are strictly increasing and stride-aligned.

use proptest::prelude::*;

use sortviz_core::{
    Advance, Algorithm, RunConfig, RunState, Step, StepIter, algorithm, replay,
};

// ============================================================================
// Strategy helpers
// ============================================================================

/// An initial array plus a trace whose indices all fit inside it.
fn trace_strategy() -> impl Strategy<Value = (Vec<i64>, Vec<Step>)> {
    (1usize..12).prop_flat_map(|n| {
        let step = prop_oneof![
            (0..n, 0..n).prop_map(|(i, j)| Step::compare(i, j)),
            (0..n, 0..n).prop_map(|(i, j)| Step::swap(i, j)),
            (0..n, -50i64..50).prop_map(|(k, v)| Step::set(k, v)),
            (0..n, -50i64..50).prop_map(|(k, v)| Step::shift(k, v)),
            (0..n).prop_map(Step::pivot),
            (0..n, 0..n).prop_map(|(i, j)| Step::merge_mark(i.min(j), i.max(j))),
            (0..n, 0..n, 0..n).prop_map(|(i, j, d)| Step::merge_compare(i, j, d)),
            (0..n).prop_map(Step::confirm),
        ];
        (
            prop::collection::vec(-50i64..50, n),
            prop::collection::vec(step, 0..120),
        )
    })
}

fn fixed(steps: Vec<Step>) -> Algorithm {
    algorithm(move |_arr: Vec<i64>| Box::new(steps.clone().into_iter()) as StepIter)
}

fn run_to_end(initial: &[i64], steps: &[Step], stride: usize) -> RunState {
    let mut state = RunState::prime(
        &fixed(steps.to_vec()),
        initial.to_vec(),
        RunConfig {
            checkpoint_stride: stride,
            precompute_cap: 10_000,
        },
    );
    while let Advance::Applied(_) = state.forward().unwrap() {}
    state
}

// ============================================================================
// Invariant 1: replay determinism
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn replay_is_deterministic((initial, steps) in trace_strategy()) {
        let snapshot = initial.clone();
        let a = replay(&initial, &steps).unwrap();
        let b = replay(&initial, &steps).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&initial, &snapshot);
        prop_assert_eq!(a.len(), initial.len());
    }
}

// ============================================================================
// Invariant 2: seek equals fresh replay, for every stride
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn seek_matches_replay_prefix((initial, steps) in trace_strategy()) {
        for stride in [1, 7, 200, steps.len() + 1] {
            let mut state = run_to_end(&initial, &steps, stride);
            for k in 0..=steps.len() {
                state.seek(k).unwrap();
                let expected = replay(&initial, &steps[..k]).unwrap();
                prop_assert_eq!(state.array(), expected.as_slice());
                let comparisons = steps[..k].iter().filter(|s| s.op().is_comparison()).count();
                prop_assert_eq!(state.metrics().comparisons, comparisons as u64);
            }
        }
    }
}

// ============================================================================
// Invariant 3: back inverts forward
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn back_inverts_forward((initial, steps) in trace_strategy()) {
        let mut state = RunState::prime(&fixed(steps.clone()), initial.clone(), RunConfig::default());
        loop {
            let before_array = state.array().to_vec();
            let before_metrics = state.metrics();
            match state.forward().unwrap() {
                Advance::Applied(idx) => {
                    prop_assert!(state.back().unwrap());
                    prop_assert_eq!(state.array(), before_array.as_slice());
                    prop_assert_eq!(state.metrics(), before_metrics);
                    prop_assert_eq!(state.forward().unwrap(), Advance::Applied(idx));
                }
                Advance::Exhausted => break,
            }
        }
        prop_assert_eq!(state.step_index(), steps.len());
    }
}

// ============================================================================
// Invariant 4: checkpoint ordering
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn checkpoints_are_ordered_and_aligned(
        (initial, steps) in trace_strategy(),
        stride in 1usize..20,
    ) {
        let state = run_to_end(&initial, &steps, stride);
        let indices: Vec<usize> = state.checkpoints().iter().map(|c| c.step_index).collect();
        prop_assert_eq!(indices[0], 0);
        prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(indices.iter().all(|i| i % stride == 0));
        prop_assert_eq!(indices.len(), steps.len() / stride + 1);
    }
}
