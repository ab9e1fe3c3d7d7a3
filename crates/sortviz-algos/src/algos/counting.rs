#![forbid(unsafe_code)]

use sortviz_core::StepIter;

use super::{Placements, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "counting",
    name: "Counting Sort",
    stable: true,
    in_place: false,
    comparison: false,
    complexity: Complexity {
        best: "O(n + k)",
        avg: "O(n + k)",
        worst: "O(n + k)",
    },
    description: "Counts occurrences of each value, then writes them back in order \
                  using prefix sums.",
    notes: &[
        "Stable",
        "Negative values handled with an offset",
        "Value ranges wider than 10n fall back to a direct ordered write-back",
    ],
};

/// Value ranges wider than this multiple of `n` skip the counts table.
const MAX_RANGE_FACTOR: i128 = 10;

/// Counting sort; emits `set` + `key` per placed value.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| Placements::new(plan(&a), a.len()))
}

/// Compute `(position, value)` writes in emission order.
fn plan(a: &[i64]) -> Vec<(usize, i64)> {
    let (Some(&min), Some(&max)) = (a.iter().min(), a.iter().max()) else {
        return Vec::new();
    };
    let size = i128::from(max) - i128::from(min) + 1;
    let limit = MAX_RANGE_FACTOR * a.len().max(1) as i128;
    if size > limit {
        tracing::trace!(size, limit, "value range too wide for counts table");
        let mut sorted = a.to_vec();
        sorted.sort_unstable();
        return sorted.into_iter().enumerate().collect();
    }

    // size <= 10n, so it fits in usize.
    let offset = |v: i64| (i128::from(v) - i128::from(min)) as usize;
    let mut starts = vec![0usize; size as usize];
    for &v in a {
        starts[offset(v)] += 1;
    }
    let mut total = 0;
    for slot in &mut starts {
        let count = *slot;
        *slot = total;
        total += count;
    }
    a.iter()
        .map(|&v| {
            let bucket = offset(v);
            let position = starts[bucket];
            starts[bucket] += 1;
            (position, v)
        })
        .collect()
}
