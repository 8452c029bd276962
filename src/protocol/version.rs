//! Version policy for incoming requests.

use super::{
    api::{API_VERSIONS_KEY, supported_range},
    error_code::ErrorCode,
};

/// Decide the response error code for a request.
///
/// Only `ApiVersions` requests are checked: a version below zero or above the
/// advertised maximum yields [`ErrorCode::UnsupportedVersion`]. Every other
/// API key is answered with [`ErrorCode::None`].
///
/// # Examples
///
/// ```
/// use brokerwire::protocol::{ErrorCode, decide_error_code};
///
/// assert_eq!(decide_error_code(18, 4), ErrorCode::None);
/// assert_eq!(decide_error_code(18, 5), ErrorCode::UnsupportedVersion);
/// assert_eq!(decide_error_code(0, 99), ErrorCode::None);
/// ```
#[must_use]
pub fn decide_error_code(api_key: i16, api_version: i16) -> ErrorCode {
    if api_key != API_VERSIONS_KEY {
        return ErrorCode::None;
    }
    match supported_range(api_key) {
        Some(range) if range.contains(api_version) => ErrorCode::None,
        _ => ErrorCode::UnsupportedVersion,
    }
}
