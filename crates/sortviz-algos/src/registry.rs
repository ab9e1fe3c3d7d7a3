#![forbid(unsafe_code)]

//! Explicit algorithm registry.
//!
//! Built once at startup with [`AlgorithmRegistry::builtin`] and passed by
//! reference to whatever creates runs. Lookups accept either the short key
//! (`"quick"`) or the display name (`"Quick Sort"`), case-insensitively.

use std::fmt;

use serde::Serialize;
use sortviz_core::{Algorithm, algorithm};

use crate::algos;
use crate::error::AlgoError;

/// Best/average/worst time complexity, as display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Complexity {
    pub best: &'static str,
    pub avg: &'static str,
    pub worst: &'static str,
}

/// Descriptive metadata for one algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub stable: bool,
    pub in_place: bool,
    pub comparison: bool,
    pub complexity: Complexity,
    pub description: &'static str,
    pub notes: &'static [&'static str],
}

struct Entry {
    info: AlgorithmInfo,
    algorithm: Algorithm,
}

/// Name-indexed collection of algorithms, in registration order.
#[derive(Default)]
pub struct AlgorithmRegistry {
    entries: Vec<Entry>,
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.info.key))
            .finish()
    }
}

impl AlgorithmRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in algorithm.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(algos::bubble::INFO, algorithm(algos::bubble::trace));
        registry.register(algos::cocktail::INFO, algorithm(algos::cocktail::trace));
        registry.register(algos::comb::INFO, algorithm(algos::comb::trace));
        registry.register(algos::insertion::INFO, algorithm(algos::insertion::trace));
        registry.register(algos::selection::INFO, algorithm(algos::selection::trace));
        registry.register(algos::shell::INFO, algorithm(algos::shell::trace));
        registry.register(algos::heap::INFO, algorithm(algos::heap::trace));
        registry.register(algos::merge::INFO, algorithm(algos::merge::trace));
        registry.register(algos::timsort::INFO, algorithm(algos::timsort::trace));
        registry.register(algos::quick::INFO, algorithm(algos::quick::trace));
        registry.register(algos::counting::INFO, algorithm(algos::counting::trace));
        registry.register(algos::radix_lsd::INFO, algorithm(algos::radix_lsd::trace));
        registry.register(algos::bucket::INFO, algorithm(algos::bucket::trace));
        registry
    }

    /// Add or replace an algorithm. Returns `true` when a previous entry with
    /// the same key was replaced.
    pub fn register(&mut self, info: AlgorithmInfo, algorithm: Algorithm) -> bool {
        let entry = Entry { info, algorithm };
        if let Some(slot) = self.entries.iter_mut().find(|e| e.info.key == info.key) {
            *slot = entry;
            return true;
        }
        tracing::trace!(key = info.key, "registered algorithm");
        self.entries.push(entry);
        false
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        let name = name.trim();
        self.entries.iter().find(|e| {
            e.info.key.eq_ignore_ascii_case(name) || e.info.name.eq_ignore_ascii_case(name)
        })
    }

    /// Look up an algorithm by key or display name.
    pub fn get(&self, name: &str) -> Result<(AlgorithmInfo, Algorithm), AlgoError> {
        self.find(name)
            .map(|e| (e.info, e.algorithm.clone()))
            .ok_or_else(|| AlgoError::UnknownAlgorithm {
                name: name.to_string(),
            })
    }

    /// Metadata for `name`, if registered.
    #[must_use]
    pub fn info(&self, name: &str) -> Option<&AlgorithmInfo> {
        self.find(name).map(|e| &e.info)
    }

    /// Metadata for every algorithm, in registration order.
    pub fn infos(&self) -> impl Iterator<Item = &AlgorithmInfo> {
        self.entries.iter().map(|e| &e.info)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
