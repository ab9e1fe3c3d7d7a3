#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, compare_and_swap, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "comb",
    name: "Comb Sort",
    stable: false,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n log n)",
        avg: "O(n^2)",
        worst: "O(n^2)",
    },
    description: "Compares elements a shrinking gap apart, smoothing out small values \
                  near the end before finishing with gap 1.",
    notes: &[
        "Not stable",
        "Shrink factor 1.3",
        "Converges toward bubble sort as the gap approaches 1",
    ],
};

/// Comb sort with a 1.3 shrink factor.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| {
        let gap = a.len();
        Comb {
            a,
            gap,
            i: 0,
            swapped: true,
            in_pass: false,
        }
    })
}

struct Comb {
    a: Vec<i64>,
    gap: usize,
    i: usize,
    swapped: bool,
    in_pass: bool,
}

impl Stepper for Comb {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        let n = self.a.len();
        if !self.in_pass {
            if self.gap <= 1 && !self.swapped {
                confirm_all(n, out);
                return false;
            }
            // gap / 1.3, in integer arithmetic.
            self.gap = (self.gap * 10 / 13).max(1);
            self.swapped = false;
            self.i = 0;
            self.in_pass = true;
        }
        if self.i + self.gap < n {
            self.swapped |= compare_and_swap(&mut self.a, self.i, self.i + self.gap, out);
            self.i += 1;
        } else {
            self.in_pass = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algos::test_support::{CASES, assert_sorts};

    #[test]
    fn sorts_all_cases() {
        for case in CASES {
            assert_sorts(trace, case);
        }
    }

    #[test]
    fn first_compare_uses_shrunk_gap() {
        let first = trace(vec![8, 7, 6, 5, 4, 3, 2, 1, 0, 9]).next().unwrap();
        assert_eq!(first, Step::compare(0, 7));
    }
}
