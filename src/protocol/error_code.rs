//! Protocol error codes carried in response bodies.

use std::fmt;

/// Error codes this server can return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ErrorCode {
    /// No error.
    #[default]
    None = 0,
    /// The requested API version is outside the advertised range.
    UnsupportedVersion = 35,
}

impl ErrorCode {
    /// Numeric value written to the wire.
    #[must_use]
    pub const fn code(self) -> i16 { self as i16 }
}

impl From<ErrorCode> for i16 {
    fn from(code: ErrorCode) -> Self { code.code() }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NONE"),
            Self::UnsupportedVersion => f.write_str("UNSUPPORTED_VERSION"),
        }
    }
}
