#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "selection",
    name: "Selection Sort",
    stable: false,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n^2)",
        avg: "O(n^2)",
        worst: "O(n^2)",
    },
    description: "Scans the unsorted tail for the minimum and swaps it to the front, \
                  shrinking the unsorted region each pass.",
    notes: &[
        "Not stable",
        "Always n*(n-1)/2 comparisons",
        "At most n-1 swaps",
    ],
};

/// Selection sort; the running minimum is tracked with `key` steps.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| Selection {
        a,
        i: 0,
        j: 0,
        min: 0,
        scanning: false,
    })
}

struct Selection {
    a: Vec<i64>,
    i: usize,
    j: usize,
    min: usize,
    scanning: bool,
}

impl Stepper for Selection {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        let n = self.a.len();
        if !self.scanning {
            if self.i + 1 >= n {
                out.push_back(Step::key_done());
                confirm_all(n, out);
                return false;
            }
            self.min = self.i;
            self.j = self.i + 1;
            self.scanning = true;
            out.push_back(Step::key(self.i, self.a[self.i]));
            return true;
        }
        if self.j < n {
            out.push_back(Step::compare(self.min, self.j));
            if self.a[self.j] < self.a[self.min] {
                self.min = self.j;
                out.push_back(Step::key(self.min, self.a[self.min]));
            }
            self.j += 1;
            return true;
        }
        let (i, min) = (self.i, self.min);
        if min != i {
            out.push_back(Step::swap_values(i, min, self.a[i], self.a[min]));
            self.a.swap(i, min);
            out.push_back(Step::key(i, self.a[i]));
        }
        self.i += 1;
        self.scanning = false;
        true
    }
}
