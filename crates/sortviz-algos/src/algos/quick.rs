#![forbid(unsafe_code)]

use std::collections::VecDeque;

use sortviz_core::{Step, StepIter};

use super::{Stepper, confirm_all, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "quick",
    name: "Quick Sort",
    stable: false,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n log n)",
        avg: "O(n log n)",
        worst: "O(n^2)",
    },
    description: "Iterative quicksort with a median-of-three pivot and Lomuto \
                  partitioning.",
    notes: &[
        "Not stable",
        "Explicit range stack, no recursion",
        "Median-of-three tames nearly sorted inputs",
    ],
};

/// Median-of-three iterative quicksort.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| {
        let high = a.len() - 1;
        Quick {
            a,
            stack: vec![(0, high)],
            partition: None,
        }
    })
}

/// Lomuto partition of `low..=high` around `a[high]`.
#[derive(Clone, Copy)]
struct Partition {
    low: usize,
    high: usize,
    /// Next slot for an element `<=` the pivot.
    store: usize,
    scan: usize,
}

struct Quick {
    a: Vec<i64>,
    stack: Vec<(usize, usize)>,
    partition: Option<Partition>,
}

impl Quick {
    fn swap(&mut self, i: usize, j: usize, out: &mut VecDeque<Step>) {
        out.push_back(Step::swap_values(i, j, self.a[i], self.a[j]));
        self.a.swap(i, j);
    }

    /// Pick the median of `low`, `mid`, `high` and move it to `high`.
    fn choose_pivot(&mut self, low: usize, high: usize, out: &mut VecDeque<Step>) {
        let mid = low + (high - low) / 2;
        out.push_back(Step::compare(low, mid));
        out.push_back(Step::compare(mid, high));
        out.push_back(Step::compare(low, high));
        let mut trio = [(self.a[low], low), (self.a[mid], mid), (self.a[high], high)];
        trio.sort_unstable();
        let median = trio[1].1;
        if median != high {
            self.swap(median, high, out);
        }
        out.push_back(Step::pivot(high));
    }
}

impl Stepper for Quick {
    fn advance(&mut self, out: &mut VecDeque<Step>) -> bool {
        if let Some(mut p) = self.partition {
            if p.scan < p.high {
                let j = p.scan;
                out.push_back(Step::compare(j, p.high));
                if self.a[j] <= self.a[p.high] {
                    if p.store != j {
                        self.swap(p.store, j, out);
                    }
                    p.store += 1;
                }
                p.scan += 1;
                self.partition = Some(p);
                return true;
            }
            let pivot_at = p.store;
            if pivot_at != p.high {
                self.swap(pivot_at, p.high, out);
            }
            self.partition = None;
            if pivot_at + 1 < p.high {
                self.stack.push((pivot_at + 1, p.high));
            }
            if p.low + 1 < pivot_at {
                self.stack.push((p.low, pivot_at - 1));
            }
            return true;
        }

        let Some((low, high)) = self.stack.pop() else {
            confirm_all(self.a.len(), out);
            return false;
        };
        if low >= high {
            return true;
        }
        self.choose_pivot(low, high, out);
        let pivot = self.a[high];
        if self.a[low..=high].iter().all(|v| *v == pivot) {
            out.extend((low..=high).map(Step::confirm));
            return true;
        }
        self.partition = Some(Partition {
            low,
            high,
            store: low,
            scan: low,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algos::test_support::{CASES, assert_sorts};
    use sortviz_core::Op;

    #[test]
    fn sorts_all_cases() {
        for case in CASES {
            assert_sorts(trace, case);
        }
    }

    #[test]
    fn median_of_three_opens_every_partition() {
        let steps: Vec<_> = trace(vec![3, 9, 1]).take(5).collect();
        // Median of (3, 9, 1) is 3 at index 0; it moves to the end.
        assert_eq!(
            steps,
            vec![
                Step::compare(0, 1),
                Step::compare(1, 2),
                Step::compare(0, 2),
                Step::swap_values(0, 2, 3, 1),
                Step::pivot(2),
            ]
        );
    }

    #[test]
    fn all_equal_range_is_confirmed_without_partitioning() {
        let steps = assert_sorts(trace, &[4, 4, 4]);
        let compares = steps.iter().filter(|s| s.op() == Op::Compare).count();
        assert_eq!(compares, 3);
    }
}
