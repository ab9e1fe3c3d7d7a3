#![forbid(unsafe_code)]

//! Simplified Timsort: fixed-length runs finished by insertion sort, then
//! bottom-up merges of doubling width.

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::merge::Window;
use super::{Stepper, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "timsort",
    name: "Timsort",
    stable: true,
    in_place: false,
    comparison: true,
    complexity: Complexity {
        best: "O(n)",
        avg: "O(n log n)",
        worst: "O(n log n)",
    },
    description: "Hybrid of insertion sort and merge sort: short runs are sorted in \
                  place, then merged pairwise with doubling width.",
    notes: &[
        "Stable",
        "Runs are MIN_RUN = 32 elements (shorter at the tail)",
        "Shows how real-world hybrids stitch two simple sorts together",
    ],
};

/// Run length handed to insertion sort.
pub const MIN_RUN: usize = 32;

pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| {
        let run = MIN_RUN.min(a.len());
        Timsort {
            a,
            run,
            phase: Phase::Runs {
                start: 0,
                i: 1,
                j: 0,
                key: 0,
                placing: false,
            },
        }
    })
}

enum Phase {
    /// Insertion sort of `a[start..start + run]`; `j` is the hole while placing.
    Runs {
        start: usize,
        i: usize,
        j: usize,
        key: i64,
        placing: bool,
    },
    Merges {
        size: usize,
        lo: usize,
        window: Option<Window>,
    },
}

struct Timsort {
    a: Vec<i64>,
    run: usize,
    phase: Phase,
}

impl Stepper for Timsort {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        let n = self.a.len();
        match &mut self.phase {
            Phase::Runs {
                start,
                i,
                j,
                key,
                placing,
            } => {
                if *start >= n {
                    self.phase = Phase::Merges {
                        size: self.run,
                        lo: 0,
                        window: None,
                    };
                    return true;
                }
                let end = (*start + self.run).min(n);
                if !*placing {
                    if *i >= end {
                        out.push_back(Step::key_done());
                        *start += self.run;
                        *i = *start + 1;
                        return true;
                    }
                    *key = self.a[*i];
                    *j = *i;
                    *placing = true;
                    out.push_back(Step::key(*i, *key));
                    return true;
                }
                let hole = *j;
                if hole > *start {
                    out.push_back(Step::compare(hole - 1, hole));
                    if self.a[hole - 1] > *key {
                        self.a[hole] = self.a[hole - 1];
                        out.push_back(Step::shift(hole, self.a[hole]));
                        *j -= 1;
                        return true;
                    }
                }
                if hole != *i {
                    self.a[hole] = *key;
                    out.push_back(Step::set(hole, *key));
                }
                out.push_back(Step::key(hole, *key));
                *i += 1;
                *placing = false;
                true
            }
            Phase::Merges { size, lo, window } => {
                if let Some(w) = window {
                    if !w.advance(&mut self.a, out) {
                        *window = None;
                    }
                    return true;
                }
                if *size >= n {
                    confirm_all(n, out);
                    return false;
                }
                if *lo >= n {
                    *size *= 2;
                    *lo = 0;
                    return true;
                }
                let start = *lo;
                let mid = (start + *size).min(n);
                let end = (start + 2 * *size).min(n);
                *lo += 2 * *size;
                if mid < end {
                    *window = Some(Window::open(&self.a, start, mid, end, out));
                }
                true
            }
        }
    }
}
