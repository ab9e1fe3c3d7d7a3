#![forbid(unsafe_code)]

use sortviz_core::StepIter;

use super::{Placements, traced};
use crate::registry::{AlgorithmInfo, Complexity};

pub const INFO: AlgorithmInfo = AlgorithmInfo {
    key: "radix_lsd",
    name: "Radix Sort LSD",
    stable: true,
    in_place: false,
    comparison: false,
    complexity: Complexity {
        best: "O(d(n + k))",
        avg: "O(d(n + k))",
        worst: "O(d(n + k))",
    },
    description: "Processes digits from least to most significant with stable \
                  counting passes.",
    notes: &[
        "Stable",
        "Negative values are offset by the minimum before the digit passes",
        "Base 10 keeps the trace readable",
    ],
};

const BASE: u64 = 10;

/// LSD radix sort; every digit pass rewrites the whole array as `set` + `key`.
pub fn trace(a: Vec<i64>) -> StepIter {
    traced(a, |a| Placements::new(plan(&a), a.len()))
}

/// All digit passes, flattened into `(position, value)` writes.
fn plan(a: &[i64]) -> Vec<(usize, i64)> {
    let Some(&min) = a.iter().min() else {
        return Vec::new();
    };
    // Offsets only kick in for negatives, so non-negative inputs keep their
    // own digits.
    let base = min.min(0);
    let mut keys: Vec<u64> = a.iter().map(|&v| v.abs_diff(base)).collect();
    let max = keys.iter().copied().max().unwrap_or(0);

    let mut writes = Vec::new();
    let mut exp = Some(1u64);
    let mut passes = 0u32;
    while let Some(e) = exp.filter(|&e| max / e > 0) {
        keys = pass(&keys, e);
        writes.extend(
            keys.iter()
                .enumerate()
                .map(|(idx, &k)| (idx, base.wrapping_add_unsigned(k))),
        );
        exp = e.checked_mul(BASE);
        passes += 1;
    }
    tracing::trace!(passes, n = a.len(), "radix plan");
    writes
}

/// One stable counting pass on the digit selected by `exp`.
fn pass(keys: &[u64], exp: u64) -> Vec<u64> {
    let digit = |k: u64| ((k / exp) % BASE) as usize;
    let mut counts = [0usize; BASE as usize];
    for &k in keys {
        counts[digit(k)] += 1;
    }
    for d in 1..counts.len() {
        counts[d] += counts[d - 1];
    }
    let mut output = vec![0u64; keys.len()];
    for &k in keys.iter().rev() {
        let d = digit(k);
        counts[d] -= 1;
        output[counts[d]] = k;
    }
    output
}
