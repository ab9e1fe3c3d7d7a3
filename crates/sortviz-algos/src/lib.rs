#![forbid(unsafe_code)]

//! Traced sorting algorithms and dataset presets for sortviz.
//!
//! # Example
//!
//! ```
//! use sortviz_algos::{AlgorithmRegistry, presets};
//! use sortviz_core::replay;
//!
//! let registry = AlgorithmRegistry::builtin();
//! let (_info, quick) = registry.get("quick").unwrap();
//! let data = presets::generate("random", 16, 1, 99, &mut presets::seeded_rng(42)).unwrap();
//! let steps: Vec<_> = quick(data.clone()).collect();
//! let mut expected = data.clone();
//! expected.sort();
//! assert_eq!(replay(&data, &steps).unwrap(), expected);
//! ```

pub mod algos;
pub mod error;
pub mod presets;
pub mod registry;

pub use error::AlgoError;
pub use presets::{DEFAULT_PRESET, Preset, seeded_rng};
pub use registry::{AlgorithmInfo, AlgorithmRegistry, Complexity};
