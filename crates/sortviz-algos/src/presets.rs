#![forbid(unsafe_code)]

//! Dataset presets.
//!
//! A `(preset, n, min, max, seed)` tuple always reproduces the same array:
//! generation draws only from the caller's RNG, and [`seeded_rng`] builds a
//! [`SmallRng`] from a `u64` seed.

use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::AlgoError;

/// Preset used when none is named.
pub const DEFAULT_PRESET: Preset = Preset::Random;

/// Shape of a generated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Random,
    NearlySorted,
    ReverseSorted,
    ReverseRun,
    FewUnique,
    Sorted,
}

impl Preset {
    pub const ALL: [Self; 6] = [
        Self::Random,
        Self::NearlySorted,
        Self::ReverseSorted,
        Self::ReverseRun,
        Self::FewUnique,
        Self::Sorted,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::NearlySorted => "nearly_sorted",
            Self::ReverseSorted => "reverse_sorted",
            Self::ReverseRun => "reverse_run",
            Self::FewUnique => "few_unique",
            Self::Sorted => "sorted",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Random => "Random (uniform)",
            Self::NearlySorted => "Nearly sorted",
            Self::ReverseSorted => "Reverse sorted",
            Self::ReverseRun => "Reverse run",
            Self::FewUnique => "Few unique",
            Self::Sorted => "Sorted ascending",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Random => "Each element drawn independently from the min/max range.",
            Self::NearlySorted => "Ascending order with a handful of random swaps.",
            Self::ReverseSorted => "Descending order.",
            Self::ReverseRun => "Descending order with one sub-run flipped to ascending.",
            Self::FewUnique => "At most five distinct values, many duplicates.",
            Self::Sorted => "Ascending order; best case for adaptive algorithms.",
        }
    }

    /// Generate `n` values in `min..=max`.
    pub fn generate<R: Rng>(
        self,
        n: usize,
        min: i64,
        max: i64,
        rng: &mut R,
    ) -> Result<Vec<i64>, AlgoError> {
        if min > max {
            return Err(AlgoError::InvalidRange { min, max });
        }
        let data = match self {
            Self::Random => uniform(n, min, max, rng),
            Self::Sorted => ascending(n, min, max, rng),
            Self::ReverseSorted => descending(n, min, max, rng),
            Self::NearlySorted => nearly_sorted(n, min, max, rng),
            Self::ReverseRun => reverse_run(n, min, max, rng),
            Self::FewUnique => few_unique(n, min, max, rng),
        };
        Ok(data)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Preset {
    type Err = AlgoError;

    fn from_str(s: &str) -> Result<Self, AlgoError> {
        Self::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| AlgoError::UnknownPreset { key: s.to_string() })
    }
}

/// Generate a dataset by preset key.
pub fn generate<R: Rng>(
    key: &str,
    n: usize,
    min: i64,
    max: i64,
    rng: &mut R,
) -> Result<Vec<i64>, AlgoError> {
    key.parse::<Preset>()?.generate(n, min, max, rng)
}

/// Deterministic RNG for a seed.
#[must_use]
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn uniform<R: Rng>(n: usize, min: i64, max: i64, rng: &mut R) -> Vec<i64> {
    (0..n).map(|_| rng.random_range(min..=max)).collect()
}

fn ascending<R: Rng>(n: usize, min: i64, max: i64, rng: &mut R) -> Vec<i64> {
    let mut data = uniform(n, min, max, rng);
    data.sort_unstable();
    data
}

fn descending<R: Rng>(n: usize, min: i64, max: i64, rng: &mut R) -> Vec<i64> {
    let mut data = ascending(n, min, max, rng);
    data.reverse();
    data
}

fn nearly_sorted<R: Rng>(n: usize, min: i64, max: i64, rng: &mut R) -> Vec<i64> {
    let mut data = ascending(n, min, max, rng);
    if n < 2 {
        return data;
    }
    for _ in 0..(n / 8).max(1) {
        let i = rng.random_range(0..n);
        let j = rng.random_range(0..n);
        data.swap(i, j);
    }
    data
}

fn reverse_run<R: Rng>(n: usize, min: i64, max: i64, rng: &mut R) -> Vec<i64> {
    let mut data = descending(n, min, max, rng);
    if n < 2 {
        return data;
    }
    let run = (n / 6).max(2);
    let start = rng.random_range(0..n.saturating_sub(run).max(1));
    let end = (start + run).min(n);
    data[start..end].reverse();
    data
}

fn few_unique<R: Rng>(n: usize, min: i64, max: i64, rng: &mut R) -> Vec<i64> {
    let span = i128::from(max) - i128::from(min) + 1;
    let target = span.clamp(1, 5) as usize;
    let mut pool: Vec<i64> = Vec::with_capacity(target);
    while pool.len() < target {
        let v = rng.random_range(min..=max);
        if !pool.contains(&v) {
            pool.push(v);
        }
    }
    pool.sort_unstable();
    (0..n).map(|_| pool[rng.random_range(0..pool.len())]).collect()
}
