//! Unit tests for the request frame codec.
//!
//! Covers length validation, partial reads, and EOF classification.

use bytes::{Bytes, BytesMut};
use rstest::rstest;
use tokio_util::codec::{Decoder, Encoder};

use super::*;

fn framed(payload: &[u8]) -> BytesMut {
    let mut buf = BytesMut::new();
    let len = i32::try_from(payload.len()).expect("test payload fits in i32");
    buf.extend_from_slice(&crate::byte_order::write_network_i32(len));
    buf.extend_from_slice(payload);
    buf
}

#[test]
fn codec_clamps_max_frame_length() {
    assert_eq!(
        RequestFrameCodec::new(MAX_FRAME_LENGTH.saturating_add(1)).max_frame_length(),
        MAX_FRAME_LENGTH
    );
    assert_eq!(RequestFrameCodec::new(0).max_frame_length(), MIN_FRAME_LENGTH);
    assert_eq!(
        RequestFrameCodec::default().max_frame_length(),
        DEFAULT_MAX_FRAME_LENGTH
    );
}

#[test]
fn decodes_back_to_back_frames() {
    let mut codec = RequestFrameCodec::default();
    let mut buf = framed(&[1, 2, 3]);
    buf.extend_from_slice(&framed(&[]));

    let first = codec.decode(&mut buf).expect("decode").expect("frame");
    assert_eq!(&first[..], &[1, 2, 3]);
    let second = codec.decode(&mut buf).expect("decode").expect("frame");
    assert!(second.is_empty());
    assert!(buf.is_empty());
}

#[test]
fn waits_for_complete_payload() {
    let mut codec = RequestFrameCodec::default();
    let mut buf = framed(&[9; 10]);
    buf.truncate(8);
    assert!(codec.decode(&mut buf).expect("decode").is_none());
    assert_eq!(buf.len(), 8, "partial frame must stay buffered");
}

#[test]
fn large_declared_length_reserves_incrementally() {
    let mut codec = RequestFrameCodec::default();
    let declared = i32::try_from(DEFAULT_MAX_FRAME_LENGTH).expect("ceiling fits in i32");
    let mut buf = BytesMut::from(&crate::byte_order::write_network_i32(declared)[..]);
    assert!(codec.decode(&mut buf).expect("decode").is_none());
    assert!(
        buf.capacity() < 4 * RESERVE_AHEAD_LIMIT,
        "reserved {} bytes for an empty payload",
        buf.capacity()
    );
}

#[test]
fn payload_larger_than_reserve_limit_still_decodes() {
    let mut codec = RequestFrameCodec::default();
    let payload = vec![0x5a; 3 * RESERVE_AHEAD_LIMIT + 1];
    let full = framed(&payload);
    let mut buf = BytesMut::new();
    for chunk in full.chunks(RESERVE_AHEAD_LIMIT / 2) {
        assert!(codec.decode(&mut buf).expect("decode").is_none());
        buf.extend_from_slice(chunk);
    }
    let frame = codec.decode(&mut buf).expect("decode").expect("frame");
    assert_eq!(frame.len(), payload.len());
    assert!(buf.is_empty());
}

#[rstest]
#[case::negative(-1)]
#[case::most_negative(i32::MIN)]
#[case::over_ceiling(10 * 1024 * 1024 + 1)]
fn rejects_invalid_lengths_without_reserving(#[case] declared: i32) {
    let mut codec = RequestFrameCodec::default();
    let mut buf = BytesMut::from(&crate::byte_order::write_network_i32(declared)[..]);
    let capacity_before = buf.capacity();

    let err = codec.decode(&mut buf).expect_err("length must be rejected");
    assert!(matches!(
        err,
        CodecError::Framing(FramingError::InvalidFrameLength { length, max })
            if length == declared && max == DEFAULT_MAX_FRAME_LENGTH
    ));
    assert_eq!(buf.capacity(), capacity_before);
}

#[test]
fn accepts_frame_at_ceiling() {
    let mut codec = RequestFrameCodec::new(MIN_FRAME_LENGTH);
    let mut buf = framed(&[0; MIN_FRAME_LENGTH]);
    let frame = codec.decode(&mut buf).expect("decode").expect("frame");
    assert_eq!(frame.len(), MIN_FRAME_LENGTH);
}

#[test]
fn decode_eof_with_empty_buffer_returns_none() {
    let mut codec = RequestFrameCodec::default();
    let mut buf = BytesMut::new();
    let result = codec.decode_eof(&mut buf);
    assert!(
        matches!(result, Ok(None)),
        "clean close should return Ok(None), got {result:?}"
    );
}

#[rstest]
#[case(&[0x00], 1)]
#[case(&[0x00, 0x00, 0x00], 3)]
fn decode_eof_mid_header(#[case] input: &[u8], #[case] received: usize) {
    let mut codec = RequestFrameCodec::default();
    let mut buf = BytesMut::from(input);
    let err = codec.decode_eof(&mut buf).expect_err("expected EOF error");
    assert!(matches!(
        err,
        CodecError::Eof(EofError::MidHeader {
            bytes_received,
            header_size: LENGTH_HEADER_SIZE,
        }) if bytes_received == received
    ));
}

#[test]
fn decode_eof_mid_frame() {
    let mut codec = RequestFrameCodec::default();
    let mut buf = framed(&[7; 6]);
    buf.truncate(LENGTH_HEADER_SIZE + 2);
    let err = codec.decode_eof(&mut buf).expect_err("expected EOF error");
    assert!(matches!(
        err,
        CodecError::Eof(EofError::MidFrame {
            bytes_received: 2,
            expected: 6,
        })
    ));
}

#[test]
fn decode_eof_yields_complete_trailing_frame() {
    let mut codec = RequestFrameCodec::default();
    let mut buf = framed(&[5, 5]);
    let frame = codec.decode_eof(&mut buf).expect("decode").expect("frame");
    assert_eq!(&frame[..], &[5, 5]);
}

#[test]
fn encoder_writes_prefixed_frames_verbatim() {
    let mut codec = RequestFrameCodec::default();
    let frame = Bytes::from_static(&[0x00, 0x00, 0x00, 0x01, 0x2a]);
    let mut dst = BytesMut::new();
    codec.encode(frame.clone(), &mut dst).expect("encode");
    assert_eq!(&dst[..], &frame[..]);
}
