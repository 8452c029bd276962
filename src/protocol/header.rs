//! Request header decoding.
//!
//! Request headers begin with three encoding-invariant fields (`api_key`,
//! `api_version`, `correlation_id`) followed by a nullable `client_id`. Older
//! clients send the client id as a legacy `i16`-length string; newer clients
//! send a compact nullable string followed by a tagged-field block.
//!
//! [`HeaderStrategy::Fallback`] tries the legacy shape first and falls back
//! to the flexible shape only when the legacy read fails structurally. A
//! flexible header whose bytes also happen to parse as a legacy string is
//! therefore read as legacy. [`HeaderStrategy::VersionAware`] removes that
//! ambiguity by choosing the shape from the per-API cutover version instead.

use bytes::Bytes;
use thiserror::Error;

use super::api::first_flexible_version;
use crate::cursor::{ByteCursor, DecodeError};

/// Wire shape in which a header's `client_id` was encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeaderEncoding {
    /// `i16` length-prefixed string, no tagged fields.
    Legacy,
    /// Compact nullable string followed by tagged fields.
    Flexible,
}

/// How the decoder picks between the legacy and flexible header shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HeaderStrategy {
    /// Legacy first, flexible if the legacy read fails.
    #[default]
    Fallback,
    /// Flexible for API versions at or above the API's cutover, legacy
    /// otherwise (and for APIs without a known cutover).
    VersionAware,
}

impl HeaderStrategy {
    /// The single encoding a version-aware decode would expect.
    #[must_use]
    pub fn expected_encoding(api_key: i16, api_version: i16) -> HeaderEncoding {
        match first_flexible_version(api_key) {
            Some(cutover) if api_version >= cutover => HeaderEncoding::Flexible,
            _ => HeaderEncoding::Legacy,
        }
    }
}

/// Errors raised while decoding a request header.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    /// No decoding strategy could read the header.
    #[error("malformed request header at {field}: {source}")]
    MalformedHeader {
        /// Header field that could not be read.
        field: &'static str,
        /// Underlying cursor failure.
        #[source]
        source: DecodeError,
    },
}

impl HeaderError {
    fn at(field: &'static str) -> impl FnOnce(DecodeError) -> Self {
        move |source| Self::MalformedHeader { field, source }
    }
}

/// Decoded request header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestHeader {
    /// Requested operation.
    pub api_key: i16,
    /// Requested operation version.
    pub api_version: i16,
    /// Client-chosen identifier echoed in the response.
    pub correlation_id: i32,
    /// Client identifier; `None` when sent as null.
    pub client_id: Option<String>,
    /// Shape the header was decoded from.
    pub encoding: HeaderEncoding,
}

impl RequestHeader {
    /// Decode a header from `cursor`, leaving it positioned at the first
    /// byte of the request body.
    ///
    /// # Errors
    ///
    /// Returns [`HeaderError::MalformedHeader`] if the fixed fields are
    /// truncated or no permitted shape can read the client id.
    ///
    /// # Examples
    ///
    /// ```
    /// use brokerwire::{
    ///     cursor::ByteCursor,
    ///     protocol::{HeaderEncoding, HeaderStrategy, RequestHeader},
    /// };
    ///
    /// let payload = [0x00, 0x12, 0x00, 0x04, 0x00, 0x00, 0x00, 0x07, 0x00, 0x04, b't', b'e', b's', b't'];
    /// let mut cursor = ByteCursor::new(&payload);
    /// let header = RequestHeader::decode(&mut cursor, HeaderStrategy::Fallback).unwrap();
    /// assert_eq!(header.correlation_id, 7);
    /// assert_eq!(header.client_id.as_deref(), Some("test"));
    /// assert_eq!(header.encoding, HeaderEncoding::Legacy);
    /// ```
    pub fn decode(cursor: &mut ByteCursor<'_>, strategy: HeaderStrategy) -> Result<Self, HeaderError> {
        let api_key = cursor.read_i16().map_err(HeaderError::at("api_key"))?;
        let api_version = cursor.read_i16().map_err(HeaderError::at("api_version"))?;
        let correlation_id = cursor.read_i32().map_err(HeaderError::at("correlation_id"))?;

        let (client_id, encoding) = match strategy {
            HeaderStrategy::Fallback => decode_client_id_with_fallback(cursor)?,
            HeaderStrategy::VersionAware => {
                let encoding = HeaderStrategy::expected_encoding(api_key, api_version);
                let client_id = match encoding {
                    HeaderEncoding::Legacy => decode_legacy(cursor),
                    HeaderEncoding::Flexible => decode_flexible(cursor),
                }
                .map_err(HeaderError::at("client_id"))?;
                (client_id, encoding)
            }
        };

        Ok(Self {
            api_key,
            api_version,
            correlation_id,
            client_id,
            encoding,
        })
    }
}

fn decode_client_id_with_fallback(
    cursor: &mut ByteCursor<'_>,
) -> Result<(Option<String>, HeaderEncoding), HeaderError> {
    let checkpoint = cursor.position();
    if let Ok(client_id) = decode_legacy(cursor) {
        return Ok((client_id, HeaderEncoding::Legacy));
    }
    cursor.seek(checkpoint);
    decode_flexible(cursor)
        .map(|client_id| (client_id, HeaderEncoding::Flexible))
        .map_err(HeaderError::at("client_id"))
}

fn decode_legacy(cursor: &mut ByteCursor<'_>) -> Result<Option<String>, DecodeError> {
    cursor.read_legacy_string()
}

fn decode_flexible(cursor: &mut ByteCursor<'_>) -> Result<Option<String>, DecodeError> {
    let client_id = cursor.read_compact_nullable_string()?;
    cursor.skip_tagged_fields()?;
    Ok(client_id)
}

/// A decoded request: its header plus the undecoded body bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    /// Decoded header.
    pub header: RequestHeader,
    /// Bytes following the header; not interpreted by this crate.
    pub body: Bytes,
}

impl Request {
    /// Decode the header at the start of `payload` and keep the rest as the
    /// request body without copying.
    ///
    /// # Errors
    ///
    /// Propagates [`HeaderError`] from [`RequestHeader::decode`].
    pub fn decode(payload: &Bytes, strategy: HeaderStrategy) -> Result<Self, HeaderError> {
        let mut cursor = ByteCursor::new(payload);
        let header = RequestHeader::decode(&mut cursor, strategy)?;
        let body = payload.slice(cursor.position()..);
        Ok(Self { header, body })
    }
}
