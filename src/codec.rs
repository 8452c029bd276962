//! Length-prefixed framing for the broker wire protocol.
//!
//! Every message on the wire is a 4-byte big-endian *signed* length followed
//! by exactly that many payload bytes. [`RequestFrameCodec`] splits inbound
//! bytes into payloads and validates the declared length before reserving
//! any buffer space for it. Space for a large payload is reserved at most
//! [`RESERVE_AHEAD_LIMIT`] bytes at a time, so a declared length alone never
//! commits the full ceiling.
//!
//! Outbound frames are produced fully formed by the response encoders (the
//! length prefix is part of the encoded response), so the encoder half of the
//! codec writes them verbatim.
//!
//! # Error Handling
//!
//! Decoding failures are reported through [`CodecError`], which separates
//! framing violations, premature EOF and transport I/O. See the [`error`]
//! module for details.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::byte_order::read_network_i32;

pub mod error;

pub use error::{CodecError, EofError, FramingError};

/// Minimum configurable frame ceiling in bytes.
///
/// Ceilings passed to [`RequestFrameCodec::new`] are clamped to at least
/// this value so that every request header fits.
pub const MIN_FRAME_LENGTH: usize = 64;

/// Maximum configurable frame ceiling in bytes (64 MiB).
pub const MAX_FRAME_LENGTH: usize = 64 * 1024 * 1024;

/// Default frame ceiling in bytes (10 MiB).
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 10 * 1024 * 1024;

/// Length prefix header size (4 bytes, big-endian `i32`).
pub const LENGTH_HEADER_SIZE: usize = 4;

/// Largest single reservation made for a payload still in flight.
pub const RESERVE_AHEAD_LIMIT: usize = 64 * 1024;

pub(crate) fn clamp_frame_length(value: usize) -> usize {
    value.clamp(MIN_FRAME_LENGTH, MAX_FRAME_LENGTH)
}

/// Codec for `[i32 length][payload]` frames.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use brokerwire::codec::RequestFrameCodec;
/// use tokio_util::codec::Decoder;
///
/// let mut codec = RequestFrameCodec::default();
/// let mut buf = BytesMut::from(&[0x00, 0x00, 0x00, 0x02, 0xab, 0xcd][..]);
/// let payload = codec.decode(&mut buf).unwrap().unwrap();
/// assert_eq!(&payload[..], &[0xab, 0xcd]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RequestFrameCodec {
    max_frame_length: usize,
}

impl RequestFrameCodec {
    /// Construct a codec rejecting frames longer than `max_frame_length`.
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: clamp_frame_length(max_frame_length),
        }
    }

    /// Return the maximum frame length accepted by this codec.
    #[must_use]
    pub const fn max_frame_length(&self) -> usize { self.max_frame_length }

    /// Validate a declared length against the sign and ceiling rules.
    fn payload_length(&self, declared: i32) -> Result<usize, FramingError> {
        usize::try_from(declared)
            .ok()
            .filter(|len| *len <= self.max_frame_length)
            .ok_or(FramingError::InvalidFrameLength {
                length: declared,
                max: self.max_frame_length,
            })
    }
}

impl Default for RequestFrameCodec {
    fn default() -> Self { Self::new(DEFAULT_MAX_FRAME_LENGTH) }
}

fn declared_length(src: &BytesMut) -> Option<i32> {
    src.get(..LENGTH_HEADER_SIZE)
        .and_then(|slice| <[u8; LENGTH_HEADER_SIZE]>::try_from(slice).ok())
        .map(read_network_i32)
}

impl Decoder for RequestFrameCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(declared) = declared_length(src) else {
            return Ok(None);
        };
        let len = self.payload_length(declared)?;
        let total = LENGTH_HEADER_SIZE + len;
        if src.len() < total {
            src.reserve((total - src.len()).min(RESERVE_AHEAD_LIMIT));
            return Ok(None);
        }
        src.advance(LENGTH_HEADER_SIZE);
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Clean close: no data remaining at frame boundary
        if src.is_empty() {
            return Ok(None);
        }
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => Err(build_eof_error(src).into()),
        }
    }
}

/// Build the appropriate EOF error based on remaining buffer state.
///
/// - [`EofError::MidHeader`]: fewer than 4 bytes of the length prefix arrived.
/// - [`EofError::MidFrame`]: the prefix is complete but the payload is short.
fn build_eof_error(src: &BytesMut) -> EofError {
    let bytes_received = src.len();
    match declared_length(src).and_then(|declared| usize::try_from(declared).ok()) {
        Some(expected) => EofError::MidFrame {
            bytes_received: bytes_received.saturating_sub(LENGTH_HEADER_SIZE),
            expected,
        },
        None => EofError::MidHeader {
            bytes_received,
            header_size: LENGTH_HEADER_SIZE,
        },
    }
}

impl Encoder<Bytes> for RequestFrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
