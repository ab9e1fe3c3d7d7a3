#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, compare_and_swap, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "bubble",
    name: "Bubble Sort",
    stable: true,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n)",
        avg: "O(n^2)",
        worst: "O(n^2)",
    },
    description: "Adjacent swaps bubble the largest values toward the end each pass, \
                  with an early exit when a pass makes no swaps.",
    notes: &[
        "Stable",
        "Every compare and swap is visible",
        "Best case O(n) thanks to swap detection",
    ],
};

/// Bubble sort with early exit.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| Bubble {
        a,
        pass: 0,
        j: 0,
        swapped: false,
    })
}

struct Bubble {
    a: Vec<i64>,
    pass: usize,
    j: usize,
    swapped: bool,
}

impl Stepper for Bubble {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        let n = self.a.len();
        // The last `pass` slots already hold their final values.
        if self.j + 1 + self.pass < n {
            self.swapped |= compare_and_swap(&mut self.a, self.j, self.j + 1, out);
            self.j += 1;
            return true;
        }
        if !self.swapped {
            confirm_all(n, out);
            return false;
        }
        self.pass += 1;
        self.j = 0;
        self.swapped = false;
        true
    }
}
