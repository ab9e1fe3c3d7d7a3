#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "insertion",
    name: "Insertion Sort",
    stable: true,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n)",
        avg: "O(n^2)",
        worst: "O(n^2)",
    },
    description: "Builds a sorted prefix by shifting larger elements right and dropping \
                  each key into place.",
    notes: &[
        "Stable",
        "Adaptive: almost-sorted inputs drop to O(n)",
        "Shell sort runs the same loop over shrinking gaps",
    ],
};

/// Insertion sort.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| GappedInsertion::new(a, vec![1]))
}

/// Insertion sort over each gap in turn, largest first.
///
/// With gaps `[1]` this is plain insertion sort; shell sort feeds it a
/// halving sequence.
pub(crate) struct GappedInsertion {
    a: Vec<i64>,
    gaps: Vec<usize>,
    gap_idx: usize,
    i: usize,
    j: usize,
    key: i64,
    placing: bool,
}

impl GappedInsertion {
    pub(crate) fn new(a: Vec<i64>, gaps: Vec<usize>) -> Self {
        let i = gaps.first().copied().unwrap_or(0);
        Self {
            a,
            gaps,
            gap_idx: 0,
            i,
            j: 0,
            key: 0,
            placing: false,
        }
    }
}

impl Stepper for GappedInsertion {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        let n = self.a.len();
        let Some(&gap) = self.gaps.get(self.gap_idx) else {
            out.push_back(Step::key_done());
            confirm_all(n, out);
            return false;
        };

        if !self.placing {
            if self.i >= n {
                self.gap_idx += 1;
                self.i = self.gaps.get(self.gap_idx).copied().unwrap_or(n);
                return true;
            }
            self.key = self.a[self.i];
            self.j = self.i;
            self.placing = true;
            out.push_back(Step::key(self.i, self.key));
            return true;
        }

        let j = self.j;
        if j >= gap {
            out.push_back(Step::compare(j - gap, j));
            if self.a[j - gap] > self.key {
                self.a[j] = self.a[j - gap];
                out.push_back(Step::shift(j, self.a[j]));
                self.j -= gap;
                return true;
            }
        }
        if j != self.i {
            self.a[j] = self.key;
            out.push_back(Step::set(j, self.key));
        }
        out.push_back(Step::key(j, self.key));
        self.i += 1;
        self.placing = false;
        true
    }
}
