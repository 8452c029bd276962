//! Error types for the framing layer.
//!
//! # Error Categories
//!
//! - [`FramingError`]: the declared frame length is unusable.
//! - [`EofError`]: end-of-stream conditions distinguishing clean closure from premature
//!   disconnection.
//! - [`CodecError`]: top-level enum wrapping both plus transport I/O errors.
//!
//! None of these are recoverable: a connection whose framing is in doubt
//! cannot be resynchronised, so the connection loop closes it.

use std::io;

use thiserror::Error;

/// Framing-level errors detected from the length prefix.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Declared length is negative or above the configured ceiling.
    #[error("invalid frame length {length} (max {max})")]
    InvalidFrameLength {
        /// Length as declared on the wire.
        length: i32,
        /// Ceiling in force for this connection.
        max: usize,
    },
}

/// EOF handling variants distinguishing normal vs. premature closure.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EofError {
    /// Clean EOF at frame boundary - normal socket closure.
    #[error("connection closed cleanly at frame boundary")]
    CleanClose,

    /// EOF received after the length prefix but before the full payload.
    #[error("premature EOF: {bytes_received} bytes of {expected} byte frame received")]
    MidFrame {
        /// Payload bytes received before EOF.
        bytes_received: usize,
        /// Declared payload size.
        expected: usize,
    },

    /// EOF received part-way through the length prefix.
    #[error("premature EOF during header: {bytes_received} of {header_size} header bytes")]
    MidHeader {
        /// Header bytes received before EOF.
        bytes_received: usize,
        /// Expected header size.
        header_size: usize,
    },
}

/// Top-level codec error taxonomy.
///
/// # Examples
///
/// ```
/// use brokerwire::codec::{CodecError, EofError, FramingError};
///
/// let err = CodecError::Framing(FramingError::InvalidFrameLength {
///     length: -1,
///     max: 1024,
/// });
/// assert_eq!(err.error_type(), "framing");
/// assert!(!err.is_clean_close());
/// assert!(CodecError::Eof(EofError::CleanClose).is_clean_close());
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// Framing layer error.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Transport layer I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// End-of-stream handling.
    #[error("EOF: {0}")]
    Eof(#[from] EofError),
}

impl CodecError {
    /// Returns true if this error represents a clean connection close.
    #[must_use]
    pub fn is_clean_close(&self) -> bool { matches!(self, Self::Eof(EofError::CleanClose)) }

    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of: `"framing"`, `"io"`, or `"eof"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Framing(_) => "framing",
            Self::Io(_) => "io",
            Self::Eof(_) => "eof",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Framing(e) => io::Error::new(io::ErrorKind::InvalidData, e),
            CodecError::Eof(e) => io::Error::new(io::ErrorKind::UnexpectedEof, e),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
