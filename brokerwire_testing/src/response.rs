//! Parsing of `ApiVersions` response frames written by the server.

use brokerwire::cursor::{ByteCursor, DecodeError};

/// One decoded `ApiVersions` response frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiVersionsFrame {
    /// Value of the frame's length prefix.
    pub length: i32,
    /// Correlation id echoed from the request.
    pub correlation_id: i32,
    /// Body error code.
    pub error_code: i16,
    /// Advertised `(api_key, min_version, max_version)` entries.
    pub api_keys: Vec<(i16, i16, i16)>,
    /// Throttle time in milliseconds.
    pub throttle_time_ms: i32,
}

/// Parse back-to-back `ApiVersions` response frames.
///
/// # Errors
///
/// Returns a [`DecodeError`] if `bytes` ends part-way through a frame.
pub fn parse_api_versions_frames(bytes: &[u8]) -> Result<Vec<ApiVersionsFrame>, DecodeError> {
    let mut cursor = ByteCursor::new(bytes);
    let mut frames = Vec::new();
    while cursor.remaining() > 0 {
        frames.push(parse_one(&mut cursor)?);
    }
    Ok(frames)
}

fn parse_one(cursor: &mut ByteCursor<'_>) -> Result<ApiVersionsFrame, DecodeError> {
    let length = cursor.read_i32()?;
    let correlation_id = cursor.read_i32()?;
    let error_code = cursor.read_i16()?;
    let entries = cursor.read_unsigned_varint()?.saturating_sub(1);
    let mut api_keys = Vec::new();
    for _ in 0..entries {
        let key = cursor.read_i16()?;
        let min = cursor.read_i16()?;
        let max = cursor.read_i16()?;
        cursor.skip_tagged_fields()?;
        api_keys.push((key, min, max));
    }
    let throttle_time_ms = cursor.read_i32()?;
    cursor.skip_tagged_fields()?;
    Ok(ApiVersionsFrame {
        length,
        correlation_id,
        error_code,
        api_keys,
        throttle_time_ms,
    })
}
