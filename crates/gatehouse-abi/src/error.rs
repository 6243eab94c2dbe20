//! Error types for call-data encoding and decoding.

use thiserror::Error;

/// Convenience type alias for Results using [`AbiError`].
pub type Result<T, E = AbiError> = std::result::Result<T, E>;

/// Failures while decoding call data or textual identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AbiError {
    /// Input ended before a full value could be read.
    #[error("input too short: needed {needed} bytes at offset {offset}, have {available}")]
    ShortInput {
        /// Offset at which the read started.
        offset: usize,
        /// Bytes required by the read.
        needed: usize,
        /// Bytes actually available in the buffer.
        available: usize,
    },

    /// A dynamic value's head offset points outside the buffer.
    #[error("invalid offset {0} for dynamic value")]
    BadOffset(usize),

    /// A boolean word held something other than 0 or 1.
    #[error("non-canonical boolean word")]
    NonCanonicalBool,

    /// An integer word does not fit in the declared width.
    #[error("integer does not fit in {bits} bits")]
    IntegerOverflow {
        /// Declared width of the integer.
        bits: u32,
    },

    /// An address word carried non-zero padding.
    #[error("address word has dirty high bytes")]
    DirtyAddress,

    /// The call data is shorter than a 4-byte selector.
    #[error("call data is shorter than a selector")]
    MissingSelector,

    /// The selector does not belong to the decoded interface.
    #[error("unknown selector {0}")]
    UnknownSelector(String),

    /// A string value is not valid UTF-8.
    #[error("string is not valid utf-8")]
    InvalidUtf8,

    /// A hexadecimal literal could not be parsed.
    #[error("invalid hex literal: {0}")]
    InvalidHex(String),
}
