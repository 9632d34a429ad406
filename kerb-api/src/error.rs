//! User-visible assembly errors.
//!
//! These surface as 4xx responses at the HTTP layer. Traversal-phase
//! outcomes are never errors; an inadmissible edge simply produces no
//! successor state.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("some but not all bicycle triangle factors were provided")]
    UnderspecifiedTriangle,

    #[error("bicycle triangle factors require optimize type TRIANGLE")]
    TriangleOptimizeTypeNotSet,

    #[error("bicycle triangle factors must sum to 1")]
    TriangleNotAffine,

    #[error("optimize type TRIANGLE requires the three triangle factors")]
    TriangleValuesNotSet,

    #[error(
        "board slack ({board}s) plus alight slack ({alight}s) exceeds transfer slack ({transfer}s)"
    )]
    SlackInvariant { board: u32, alight: u32, transfer: u32 },

    #[error("cannot parse date/time: {0}")]
    UnparseableDateTime(String),

    #[error("unknown traverse mode: {0}")]
    UnknownMode(String),
}
