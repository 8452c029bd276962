//! Helpers for explicit network byte-order conversions.
//!
//! Every fixed-width integer on the broker wire is signed and big-endian.
//! These helpers keep Clippy expectations scoped to the conversion points so
//! protocol code can remain explicit about wire endianness without repeating
//! lint annotations.

/// Serialise an `i16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use brokerwire::byte_order::write_network_i16;
///
/// assert_eq!(write_network_i16(18), [0x00, 0x12]);
/// assert_eq!(write_network_i16(-1), [0xff, 0xff]);
/// ```
#[must_use]
pub fn write_network_i16(value: i16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `i16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use brokerwire::byte_order::read_network_i16;
///
/// assert_eq!(read_network_i16([0x00, 0x12]), 18);
/// assert_eq!(read_network_i16([0xff, 0xff]), -1);
/// ```
#[must_use]
pub fn read_network_i16(bytes: [u8; 2]) -> i16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    i16::from_be_bytes(bytes)
}

/// Serialise an `i32` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use brokerwire::byte_order::write_network_i32;
///
/// assert_eq!(write_network_i32(19), [0x00, 0x00, 0x00, 0x13]);
/// ```
#[must_use]
pub fn write_network_i32(value: i32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `i32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use brokerwire::byte_order::read_network_i32;
///
/// assert_eq!(read_network_i32([0x00, 0x00, 0x00, 0x07]), 7);
/// assert_eq!(read_network_i32([0xff, 0xff, 0xff, 0xfe]), -2);
/// ```
#[must_use]
pub fn read_network_i32(bytes: [u8; 4]) -> i32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    i32::from_be_bytes(bytes)
}
