#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "heap",
    name: "Heap Sort",
    stable: false,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n log n)",
        avg: "O(n log n)",
        worst: "O(n log n)",
    },
    description: "Builds a max-heap, then repeatedly swaps the root to the end of the \
                  shrinking heap.",
    notes: &[
        "Not stable",
        "Heap construction runs in linear time",
        "O(n log n) even on adversarial inputs",
    ],
};

/// Heap sort; elements are confirmed as they leave the heap.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| {
        let build = a.len() / 2;
        Heap {
            a,
            phase: Phase::Build { remaining: build },
            sift: None,
        }
    })
}

#[derive(Clone, Copy)]
enum Phase {
    /// Sift down roots `remaining - 1` through 0.
    Build { remaining: usize },
    /// Move the root to `end`, then restore the heap over `0..end`.
    Extract { end: usize },
}

/// An in-progress sift-down over `root..=end`.
#[derive(Clone, Copy)]
struct Sift {
    root: usize,
    end: usize,
}

struct Heap {
    a: Vec<i64>,
    phase: Phase,
    sift: Option<Sift>,
}

impl Heap {
    /// One level of sift-down. Returns the next state, `None` when settled.
    fn sift_level(&mut self, Sift { root, end }: Sift, out: &mut VecDeque<Step>) -> Option<Sift> {
        let child = 2 * root + 1;
        if child > end {
            return None;
        }
        let mut largest = root;
        out.push_back(Step::compare(largest, child));
        if self.a[largest] < self.a[child] {
            largest = child;
        }
        let right = child + 1;
        if right <= end {
            out.push_back(Step::compare(largest, right));
            if self.a[largest] < self.a[right] {
                largest = right;
            }
        }
        if largest == root {
            return None;
        }
        out.push_back(Step::swap_values(root, largest, self.a[root], self.a[largest]));
        self.a.swap(root, largest);
        Some(Sift { root: largest, end })
    }
}

impl Stepper for Heap {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        if let Some(sift) = self.sift {
            self.sift = self.sift_level(sift, out);
            return true;
        }
        let n = self.a.len();
        match self.phase {
            Phase::Build { remaining: 0 } => {
                self.phase = Phase::Extract { end: n - 1 };
            }
            Phase::Build { remaining } => {
                self.sift = Some(Sift {
                    root: remaining - 1,
                    end: n - 1,
                });
                self.phase = Phase::Build {
                    remaining: remaining - 1,
                };
            }
            Phase::Extract { end: 0 } => {
                out.push_back(Step::confirm(0));
                return false;
            }
            Phase::Extract { end } => {
                out.push_back(Step::swap_values(0, end, self.a[0], self.a[end]));
                self.a.swap(0, end);
                out.push_back(Step::confirm(end));
                self.sift = Some(Sift { root: 0, end: end - 1 });
                self.phase = Phase::Extract { end: end - 1 };
            }
        }
        true
    }
}
