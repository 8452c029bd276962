//! Unit tests for codec error types.

use std::io;

use super::{CodecError, EofError, FramingError};

#[test]
fn clean_eof_is_detectable() {
    let err = CodecError::Eof(EofError::CleanClose);
    assert!(err.is_clean_close());
    assert_eq!(err.error_type(), "eof");
}

#[test]
fn mid_frame_eof_is_not_clean() {
    let err = CodecError::Eof(EofError::MidFrame {
        bytes_received: 100,
        expected: 200,
    });
    assert!(!err.is_clean_close());
}

#[test]
fn invalid_length_converts_to_invalid_data() {
    let err: io::Error = CodecError::Framing(FramingError::InvalidFrameLength {
        length: -5,
        max: 64,
    })
    .into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(err.to_string().contains("-5"));
}

#[test]
fn eof_converts_to_unexpected_eof() {
    let err: io::Error = CodecError::Eof(EofError::MidHeader {
        bytes_received: 2,
        header_size: 4,
    })
    .into();
    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn io_error_passes_through() {
    let err: io::Error = CodecError::Io(io::Error::other("reset")).into();
    assert_eq!(err.kind(), io::ErrorKind::Other);
    assert_eq!(err.to_string(), "reset");
}
