#![forbid(unsafe_code)]

//! Error taxonomy for step traces.
//!
//! Exhaustion of a step source is not an error (see
//! [`Pull::Exhausted`](crate::source::Pull)) and neither is backpressure,
//! which the runtime reports as a notification.

use thiserror::Error;

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, TraceError>;

/// Errors raised while decoding, applying, or replaying steps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A step violates its operation's arity or payload contract, or points
    /// outside the array.
    #[error("malformed {op} step: {reason}")]
    MalformedStep { op: String, reason: String },

    /// An operation name outside the closed set reached the engine.
    #[error("unsupported step operation: {op:?}")]
    UnsupportedOperation { op: String },

    /// The precompute cap was exceeded while draining a step source.
    #[error("step source exceeded the precompute cap of {cap} steps")]
    CapacityExceeded { cap: usize },

    /// A replayed trace did not reproduce the expected array.
    #[error("replay mismatch at index {index}: expected {expected}, got {actual}")]
    ReplayMismatch {
        index: usize,
        expected: i64,
        actual: i64,
    },

    /// A replayed trace produced an array of the wrong length.
    #[error("replay produced {actual} elements, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// An exported trace document could not be decoded.
    #[error("trace document error: {0}")]
    Json(String),
}

impl TraceError {
    /// Shorthand for [`TraceError::MalformedStep`].
    #[must_use]
    pub fn malformed(op: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedStep {
            op: op.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is internal bookkeeping that callers never see.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}

impl From<serde_json::Error> for TraceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::TraceError;

    #[test]
    fn malformed_constructor_formats_op_and_reason() {
        let err = TraceError::malformed("set", "missing integer payload");
        assert_eq!(err.to_string(), "malformed set step: missing integer payload");
    }

    #[test]
    fn capacity_is_the_only_internal_error() {
        assert!(TraceError::CapacityExceeded { cap: 10 }.is_internal());
        assert!(
            !TraceError::UnsupportedOperation {
                op: "rotate".into()
            }
            .is_internal()
        );
    }
}
