#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, compare_and_swap, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "cocktail",
    name: "Cocktail Shaker Sort",
    stable: true,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n)",
        avg: "O(n^2)",
        worst: "O(n^2)",
    },
    description: "Bi-directional bubble sort: a forward pass bubbles large items right, \
                  the backward pass settles small items left.",
    notes: &[
        "Stable",
        "Moves small values at the end leftward faster than bubble sort",
        "The sorted zone grows from both ends",
    ],
};

/// Cocktail shaker sort.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| {
        let end = a.len() - 1;
        Cocktail {
            a,
            start: 0,
            end,
            i: 0,
            forward: true,
            swapped: false,
        }
    })
}

struct Cocktail {
    a: Vec<i64>,
    start: usize,
    end: usize,
    i: usize,
    forward: bool,
    swapped: bool,
}

impl Cocktail {
    fn finish(&self, out: &mut VecDeque<Step>) -> bool {
        confirm_all(self.a.len(), out);
        false
    }
}

impl Stepper for Cocktail {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        if self.forward {
            if self.start >= self.end {
                return self.finish(out);
            }
            if self.i < self.end {
                self.swapped |= compare_and_swap(&mut self.a, self.i, self.i + 1, out);
                self.i += 1;
                return true;
            }
            out.push_back(Step::confirm(self.end));
            self.end -= 1;
            if !self.swapped {
                return self.finish(out);
            }
            self.swapped = false;
            self.forward = false;
            self.i = self.end;
            true
        } else {
            if self.i > self.start {
                self.swapped |= compare_and_swap(&mut self.a, self.i - 1, self.i, out);
                self.i -= 1;
                return true;
            }
            out.push_back(Step::confirm(self.start));
            self.start += 1;
            if !self.swapped {
                return self.finish(out);
            }
            self.swapped = false;
            self.forward = true;
            self.i = self.start;
            true
        }
    }
}
