#![forbid(unsafe_code)]

//! Built-in traced sorting algorithms.
//!
//! Every algorithm is an explicit state machine implementing [`Stepper`].
//! [`Traced`] turns a stepper into a lazy [`Iterator`] of steps: each call to
//! [`Stepper::advance`] performs one small unit of work (typically a single
//! comparison and its consequence) on a private working copy of the array
//! and queues the steps describing it.
//!
//! Replaying the emitted steps on the original input always yields the
//! stepper's own working array, and every run ends with every index
//! confirmed.

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

pub mod bubble;
pub mod bucket;
pub mod cocktail;
pub mod comb;
pub mod counting;
pub mod heap;
pub mod insertion;
pub mod merge;
pub mod quick;
pub mod radix_lsd;
pub mod selection;
pub mod shell;
pub mod timsort;

/// A resumable sorting algorithm.
pub trait Stepper: Send {
    /// Do the next unit of work, queueing its steps into `out`.
    ///
    /// Returns `false` once the algorithm has queued its final steps.
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool;
}

/// Lazy step iterator over a [`Stepper`].
pub struct Traced<S> {
    stepper: S,
    queue: VecDeque<Step>,
    done: bool,
}

impl<S: Stepper> Traced<S> {
    #[must_use]
    pub fn new(stepper: S) -> Self {
        Self {
            stepper,
            queue: VecDeque::new(),
            done: false,
        }
    }
}

impl<S: Stepper> Iterator for Traced<S> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        loop {
            if let Some(step) = self.queue.pop_front() {
                return Some(step);
            }
            if self.done {
                return None;
            }
            self.done = !self.stepper.advance(&mut self.queue);
        }
    }
}

/// Build a boxed step iterator, short-circuiting arrays of length 0 or 1.
pub(crate) fn traced<S, F>(a: Vec<i64>, make: F) -> StepIter
where
    S: Stepper + 'static,
    F: FnOnce(Vec<i64>) -> S,
{
    match a.len() {
        0 => Box::new(std::iter::empty()),
        1 => Box::new(std::iter::once(Step::confirm(0))),
        _ => Box::new(Traced::new(make(a))),
    }
}

/// Replays precomputed `(position, value)` writes as `set` + `key` pairs,
/// one write per advance, then confirms all `n` indices.
///
/// Shared by the distribution sorts, which decide every placement up front.
pub(crate) struct Placements {
    writes: Vec<(usize, i64)>,
    next: usize,
    n: usize,
}

impl Placements {
    pub(crate) fn new(writes: Vec<(usize, i64)>, n: usize) -> Self {
        Self { writes, next: 0, n }
    }
}

impl Stepper for Placements {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        match self.writes.get(self.next) {
            Some(&(position, value)) => {
                out.push_back(Step::set(position, value));
                out.push_back(Step::key(position, value));
                self.next += 1;
                true
            }
            None => {
                confirm_all(self.n, out);
                false
            }
        }
    }
}

/// Queue `confirm(i)` for every index.
pub(crate) fn confirm_all(n: usize, out: &mut VecDeque<Step>) {
    out.extend((0..n).map(Step::confirm));
}

/// Queue `compare(i, j)` and, when out of order, the swap; returns whether
/// the pair was swapped.
pub(crate) fn compare_and_swap(a: &mut [i64], i: usize, j: usize, out: &mut VecDeque<Step>) -> bool {
    out.push_back(Step::compare(i, j));
    if a[i] > a[j] {
        out.push_back(Step::swap_values(i, j, a[i], a[j]));
        a.swap(i, j);
        true
    } else {
        false
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use sortviz_core::{Op, Step, StepIter, replay};

    /// Replay `trace(input)` and check it sorts and confirms every index.
    pub fn assert_sorts(trace: fn(Vec<i64>) -> StepIter, input: &[i64]) -> Vec<Step> {
        let steps: Vec<Step> = trace(input.to_vec()).collect();
        for step in &steps {
            step.validate().unwrap();
        }
        let out = replay(input, &steps).unwrap();
        let mut expected = input.to_vec();
        expected.sort_unstable();
        assert_eq!(out, expected, "input {input:?}");
        let mut confirmed = vec![false; input.len()];
        for step in steps.iter().filter(|s| s.op() == Op::Confirm) {
            confirmed[step.indices()[0]] = true;
        }
        assert!(confirmed.iter().all(|c| *c), "unconfirmed index for {input:?}");
        steps
    }

    pub const CASES: &[&[i64]] = &[
        &[],
        &[1],
        &[2, 1],
        &[1, 2],
        &[5, 3, 1, 4],
        &[9, 1, 8, 2, 7],
        &[3, 3, 3, 3],
        &[-4, 10, 0, -4, 7, 7, 2, -9],
        &[10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
        &[1, 2, 3, 4, 5, 6, 7, 8],
    ];
}
