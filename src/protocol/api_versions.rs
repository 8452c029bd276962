//! Encoding of the capability-negotiation (`ApiVersions`) response.
//!
//! The response uses the flexible body layout (compact array, tagged-field
//! markers) behind a plain correlation-id response header:
//!
//! ```text
//! [i32 length][i32 correlation_id]
//! [i16 error_code]
//! [uvarint N+1] N × { [i16 api_key][i16 min][i16 max][uvarint 0 tags] }
//! [i32 throttle_time_ms]
//! [uvarint 0 tags]
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    api::{ApiVersionRange, SUPPORTED_APIS},
    error_code::ErrorCode,
};
use crate::codec::LENGTH_HEADER_SIZE;

/// Size of the response header (the correlation id).
const RESPONSE_HEADER_SIZE: usize = 4;
/// Encoded size of one API entry: three `i16`s plus an empty tag block.
const ENTRY_SIZE: usize = 7;

/// Logical content of an `ApiVersions` response body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    /// Outcome of the version check.
    pub error_code: ErrorCode,
    /// Advertised API ranges, in wire order.
    pub api_keys: Vec<ApiVersionRange>,
    /// Throttle time in milliseconds; always zero.
    pub throttle_time_ms: i32,
}

impl ApiVersionsResponse {
    /// Response advertising [`SUPPORTED_APIS`] with the given error code.
    #[must_use]
    pub fn new(error_code: ErrorCode) -> Self {
        Self {
            error_code,
            api_keys: SUPPORTED_APIS.to_vec(),
            throttle_time_ms: 0,
        }
    }

    /// Encoded size of the body in bytes.
    #[must_use]
    pub fn body_len(&self) -> usize {
        // error code + array length + entries + throttle + tag block
        2 + varint_len(self.api_keys.len() as u64 + 1)
            + self.api_keys.len() * ENTRY_SIZE
            + 4
            + 1
    }

    /// Append the body to `dst`.
    pub fn encode_body(&self, dst: &mut impl BufMut) {
        dst.put_i16(self.error_code.code());
        put_unsigned_varint(dst, self.api_keys.len() as u64 + 1);
        for range in &self.api_keys {
            dst.put_i16(range.api_key);
            dst.put_i16(range.min_version);
            dst.put_i16(range.max_version);
            put_unsigned_varint(dst, 0);
        }
        dst.put_i32(self.throttle_time_ms);
        put_unsigned_varint(dst, 0);
    }

    /// Encode the complete length-prefixed frame for `correlation_id`.
    #[must_use]
    pub fn encode_frame(&self, correlation_id: i32) -> Bytes {
        let body_len = self.body_len();
        let frame_len = RESPONSE_HEADER_SIZE + body_len;
        let mut dst = BytesMut::with_capacity(LENGTH_HEADER_SIZE + frame_len);
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_possible_wrap,
            reason = "response frames are a few dozen bytes"
        )]
        dst.put_i32(frame_len as i32);
        dst.put_i32(correlation_id);
        self.encode_body(&mut dst);
        debug_assert_eq!(dst.len(), LENGTH_HEADER_SIZE + frame_len);
        dst.freeze()
    }
}

/// Encode the `ApiVersions` response frame for a request.
///
/// Infallible and free of I/O; the result starts with its own length prefix
/// and can be written verbatim.
///
/// # Examples
///
/// ```
/// use brokerwire::protocol::{ErrorCode, encode_api_versions_response};
///
/// let frame = encode_api_versions_response(7, ErrorCode::None);
/// assert_eq!(
///     &frame[..],
///     &[
///         0x00, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x02, 0x00, 0x12, 0x00,
///         0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     ]
/// );
/// ```
#[must_use]
pub fn encode_api_versions_response(correlation_id: i32, error_code: ErrorCode) -> Bytes {
    ApiVersionsResponse::new(error_code).encode_frame(correlation_id)
}

fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Append `value` as an unsigned base-128 varint, low group first.
///
/// ```
/// use brokerwire::protocol::put_unsigned_varint;
///
/// let mut out = Vec::new();
/// put_unsigned_varint(&mut out, 300);
/// assert_eq!(out, [0xac, 0x02]);
/// ```
pub fn put_unsigned_varint(dst: &mut impl BufMut, mut value: u64) {
    while value >= 0x80 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "value is masked to seven bits"
        )]
        dst.put_u8((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    #[expect(clippy::cast_possible_truncation, reason = "value is below 0x80")]
    dst.put_u8(value as u8);
}
