//! Error types for temporal computations.
//!
//! An absent result is not an error in this crate: synchronization or
//! restriction over non-overlapping time domains returns `Option::None`,
//! and the `ever`/`always` predicates fold absence into a definite
//! boolean. `TemporalError` is reserved for genuine faults.

use thiserror::Error;

use crate::time::{Period, Timestamp};

/// Errors produced by temporal construction and evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemporalError {
    /// Malformed input: empty instant array, non-increasing timestamps,
    /// invalid bounds, division by zero, and similar.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value was requested outside the operand's temporal domain.
    #[error("Timestamp {t} is outside the period {period}")]
    OutOfRange { t: Timestamp, period: Period },

    /// A value was requested at a non-instant timestamp under discrete
    /// interpolation.
    #[error("Value undefined at {0}: discrete interpolation has no value between instants")]
    Undefined(Timestamp),

    /// The requested operator and result type are incompatible, e.g.
    /// linear interpolation over a base type without an interpolation
    /// rule, or a similarity metric over a base type without a distance.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Overflow in the underlying numeric arithmetic, propagated
    /// unchanged from the base-type implementation.
    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    /// Malformed wire data.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TemporalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemporalError::InvalidArgument("zero instants".into());
        assert_eq!(err.to_string(), "Invalid argument: zero instants");

        let err = TemporalError::Undefined(Timestamp::from_secs(5));
        assert!(err.to_string().contains("discrete interpolation"));
    }
}
