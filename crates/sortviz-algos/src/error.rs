#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors from algorithm and dataset lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgoError {
    #[error("unknown algorithm: {name:?}")]
    UnknownAlgorithm { name: String },

    #[error("unknown preset: {key:?}")]
    UnknownPreset { key: String },

    #[error("invalid value range: min {min} is greater than max {max}")]
    InvalidRange { min: i64, max: i64 },
}
