#![forbid(unsafe_code)]

use sortviz_core::StepIter;

use super::{Placements, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "bucket",
    name: "Bucket Sort",
    stable: true,
    in_place: false,
    comparison: false,
    complexity: Complexity {
        best: "O(n)",
        avg: "O(n + k)",
        worst: "O(n^2)",
    },
    description: "Spreads values over evenly sized buckets by their position in the \
                  value range, sorts each bucket, then concatenates them.",
    notes: &[
        "Stable with a stable per-bucket sort",
        "Best on uniformly distributed data",
        "All-equal inputs are confirmed without any writes",
    ],
};

/// Bucket sort; emits `set` + `key` per value as the buckets are drained.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| Placements::new(plan(&a), a.len()))
}

fn plan(a: &[i64]) -> Vec<(usize, i64)> {
    let (Some(&min), Some(&max)) = (a.iter().min(), a.iter().max()) else {
        return Vec::new();
    };
    if min == max {
        return Vec::new();
    }
    let range = u128::from(max.abs_diff(min));
    // At most n buckets, and never more than there are distinct values.
    let count = (a.len() as u128).min(range + 1).max(1) as usize;
    let mut buckets: Vec<Vec<i64>> = vec![Vec::new(); count];
    for &v in a {
        let slot = u128::from(v.abs_diff(min)) * (count as u128 - 1) / range;
        buckets[slot as usize].push(v);
    }
    tracing::trace!(buckets = count, n = a.len(), "bucket plan");
    buckets
        .into_iter()
        .flat_map(|mut bucket| {
            bucket.sort();
            bucket
        })
        .enumerate()
        .collect()
}
