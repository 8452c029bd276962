//! Forward-only decoding of protocol primitives from an in-memory buffer.
//!
//! [`ByteCursor`] borrows a frame payload and exposes the primitive readers
//! used by request headers: fixed-width signed integers, legacy `i16`
//! length-prefixed strings, unsigned varints, compact nullable strings and
//! tagged-field blocks.
//!
//! A successful read advances the position by exactly the bytes it consumed.
//! A failed read may leave the position anywhere inside the attempted value,
//! so callers that want to retry with another strategy must record
//! [`ByteCursor::position`] beforehand and restore it with
//! [`ByteCursor::seek`].

use thiserror::Error;

use crate::byte_order::{read_network_i16, read_network_i32};

/// Longest encoding of a 64-bit unsigned varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Errors produced while decoding primitives from a [`ByteCursor`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes remain than the value requires.
    #[error("truncated input: need {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        /// Bytes required to finish the read.
        needed: usize,
        /// Bytes left in the buffer when the read was attempted.
        remaining: usize,
    },
    /// A varint ran past ten bytes or exceeded 64 bits.
    #[error("unsigned varint overflows 64 bits")]
    VarintOverflow,
}

/// Result alias for cursor reads.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Sequential reader over a borrowed byte buffer.
///
/// # Examples
///
/// ```
/// use brokerwire::cursor::ByteCursor;
///
/// let mut cursor = ByteCursor::new(&[0x00, 0x12, 0x00, 0x04]);
/// assert_eq!(cursor.read_i16(), Ok(18));
/// assert_eq!(cursor.read_i16(), Ok(4));
/// assert_eq!(cursor.remaining(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at the start of `buf`.
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    /// Current offset from the start of the buffer.
    #[must_use]
    pub const fn position(&self) -> usize { self.pos }

    /// Restore the cursor to `position`, typically a checkpoint taken with
    /// [`position`](Self::position).
    ///
    /// Positions past the end are clamped to the buffer length.
    pub fn seek(&mut self, position: usize) { self.pos = position.min(self.buf.len()); }

    /// Number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize { self.buf.len() - self.pos }

    /// Unread bytes, without consuming them.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] { &self.buf[self.pos..] }

    /// Consume exactly `n` bytes and return them.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedInput`] if fewer than `n` bytes remain.
    pub fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DecodeError::TruncatedInput {
                needed: n,
                remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a big-endian `i16`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedInput`] if fewer than two bytes remain.
    pub fn read_i16(&mut self) -> DecodeResult<i16> { self.take_array().map(read_network_i16) }

    /// Read a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedInput`] if fewer than four bytes remain.
    pub fn read_i32(&mut self) -> DecodeResult<i32> { self.take_array().map(read_network_i32) }

    /// Read a legacy nullable string: an `i16` length followed by that many
    /// bytes. A negative length denotes null and consumes nothing further.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedInput`] if the length field or the
    /// declared content is incomplete.
    ///
    /// # Examples
    ///
    /// ```
    /// use brokerwire::cursor::ByteCursor;
    ///
    /// let mut cursor = ByteCursor::new(&[0x00, 0x02, b'h', b'i', 0xff, 0xff]);
    /// assert_eq!(cursor.read_legacy_string(), Ok(Some("hi".to_string())));
    /// assert_eq!(cursor.read_legacy_string(), Ok(None));
    /// ```
    pub fn read_legacy_string(&mut self) -> DecodeResult<Option<String>> {
        let len = self.read_i16()?;
        let Ok(len) = usize::try_from(len) else {
            return Ok(None);
        };
        self.take(len).map(|bytes| Some(lossy_string(bytes)))
    }

    /// Read an unsigned base-128 varint, least-significant group first.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::TruncatedInput`] if the buffer ends before a
    /// byte without the continuation bit, and
    /// [`DecodeError::VarintOverflow`] if the value does not fit in 64 bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use brokerwire::cursor::ByteCursor;
    ///
    /// let mut cursor = ByteCursor::new(&[0xac, 0x02]);
    /// assert_eq!(cursor.read_unsigned_varint(), Ok(300));
    /// ```
    pub fn read_unsigned_varint(&mut self) -> DecodeResult<u64> {
        let mut value: u64 = 0;
        for (index, &byte) in self.rest().iter().take(MAX_VARINT_LEN).enumerate() {
            let group = u64::from(byte & 0x7f);
            // The tenth byte may only carry the single remaining bit.
            if index == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(DecodeError::VarintOverflow);
            }
            value |= group << (7 * index);
            if byte & 0x80 == 0 {
                self.pos += index + 1;
                return Ok(value);
            }
        }
        let remaining = self.remaining();
        Err(DecodeError::TruncatedInput {
            needed: remaining + 1,
            remaining,
        })
    }

    /// Read a compact nullable string: a varint `N` where `0` is null and
    /// otherwise `N - 1` content bytes follow.
    ///
    /// # Errors
    ///
    /// Propagates varint failures and returns
    /// [`DecodeError::TruncatedInput`] if the content is incomplete.
    pub fn read_compact_nullable_string(&mut self) -> DecodeResult<Option<String>> {
        let encoded = self.read_unsigned_varint()?;
        let Some(len) = encoded.checked_sub(1) else {
            return Ok(None);
        };
        let len = self.length_to_usize(len)?;
        self.take(len).map(|bytes| Some(lossy_string(bytes)))
    }

    /// Skip a tagged-field block: a varint count followed by `count` entries
    /// of `{tag: varint, size: varint, payload: [u8; size]}`.
    ///
    /// Returns the number of fields skipped.
    ///
    /// # Errors
    ///
    /// Fails if any tag, size or payload is incomplete.
    pub fn skip_tagged_fields(&mut self) -> DecodeResult<u64> {
        let count = self.read_unsigned_varint()?;
        for _ in 0..count {
            let _tag = self.read_unsigned_varint()?;
            let size = self.read_unsigned_varint()?;
            let size = self.length_to_usize(size)?;
            self.take(size)?;
        }
        Ok(count)
    }

    /// Convert a declared length to `usize`, reporting lengths that cannot
    /// possibly fit as truncation.
    fn length_to_usize(&self, len: u64) -> DecodeResult<usize> {
        usize::try_from(len).map_err(|_| DecodeError::TruncatedInput {
            needed: usize::MAX,
            remaining: self.remaining(),
        })
    }
}

fn lossy_string(bytes: &[u8]) -> String { String::from_utf8_lossy(bytes).into_owned() }
