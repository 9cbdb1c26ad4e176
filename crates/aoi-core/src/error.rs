//! Error taxonomy for the aggregation core.

use thiserror::Error;

use crate::record::ContextKey;

/// Errors surfaced by run construction and aggregation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// A record carries a value the algorithm cannot work with.
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    /// A context's records violate the non-decreasing start invariant and
    /// sorting was disabled, or equal timestamps carry conflicting labels.
    #[error("unsorted input at row {row}: {reason}")]
    UnsortedInput { row: usize, reason: String },

    /// No records were supplied and strict mode is on.
    #[error("no input records")]
    EmptyInput,
}

/// A context that could not be processed. Other contexts are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFailure {
    pub context: ContextKey,
    pub error: AggregateError,
}
