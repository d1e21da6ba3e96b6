//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("end of buffer: need {needed} bytes at offset {offset}, {available} available")]
    EndOfBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("length exceeded: {0} > {1}")]
    LengthExceeded(usize, usize), // found, max
    #[error("element count {count} exceeds remaining buffer of {remaining} bytes")]
    InvalidCount { count: usize, remaining: usize },
    #[error("delimited array must contain at least one element")]
    EmptyDelimited,
    #[error("invalid scalar width: {0} bytes")]
    InvalidWidth(usize),
    #[error("invalid count prefix width: {0} (expected 1..=4)")]
    InvalidCountWidth(usize),
    #[error("fixed-element array requires a fixed-length element codec")]
    UnfixedElement,
    #[error("recursive composite must take exactly one placeholder, took {0}")]
    PlaceholderCount(usize),
    #[error("recursive codec used before its composite was built")]
    UnboundPlaceholder,
    #[error("slice bounds out of range: offset {offset}, limit {limit}, len {len}")]
    InvalidSlice {
        offset: usize,
        limit: usize,
        len: usize,
    },
}
