#![forbid(unsafe_code)]

use sortviz_core::StepIter;

use super::insertion::GappedInsertion;
use super::traced;
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "shell",
    name: "Shell Sort",
    stable: false,
    in_place: true,
    comparison: true,
    complexity: Complexity {
        best: "O(n log n)",
        avg: "O(n^2)",
        worst: "O(n^2)",
    },
    description: "Insertion sort over gapped subsequences, halving the gap until a \
                  final pass with gap 1.",
    notes: &[
        "Not stable",
        "Gap sequence n/2, n/4, ..., 1",
        "Disorder visibly shrinks with each gap",
    ],
};

/// Halving gap sequence for `n` elements: `n/2, n/4, ..., 1`.
fn gaps(n: usize) -> Vec<usize> {
    std::iter::successors(Some(n / 2), |g| Some(g / 2))
        .take_while(|g| *g > 0)
        .collect()
}

/// Shell sort.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| {
        let gaps = gaps(a.len());
        GappedInsertion::new(a, gaps)
    })
}
