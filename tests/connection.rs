//! End-to-end tests for the connection loop over in-memory streams.

use std::sync::Arc;

use brokerwire::{
    config::ConnectionOptions,
    connection::{ConnectionError, handle_connection},
    dispatch::Router,
    protocol::{HeaderStrategy, Request},
    transport::TransportError,
};
use brokerwire_testing::{
    LoggerHandle,
    RequestFrame,
    drive_connection,
    frames::length_prefix,
    logger,
    parse_api_versions_frames,
};
use bytes::Bytes;
use log::Level;
use rstest::rstest;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

#[rstest]
#[case::v0(0, 0)]
#[case::v3(3, 0)]
#[case::v4(4, 0)]
#[case::v5(5, 35)]
#[case::negative(-1, 35)]
#[tokio::test]
async fn version_policy_is_applied(#[case] version: i16, #[case] expected: i16) {
    let request = RequestFrame::api_versions(version, 42).client_id("probe").encode();
    let run = drive_connection(Router::new(), ConnectionOptions::default(), vec![request])
        .await
        .expect("drive connection");
    assert_eq!(run.result.expect("clean close"), 1);
    let responses = parse_api_versions_frames(&run.output).expect("parse responses");
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].correlation_id, 42);
    assert_eq!(responses[0].error_code, expected);
    assert_eq!(responses[0].api_keys, [(18, 0, 4)]);
}

#[tokio::test]
async fn any_api_key_gets_api_versions_answer() {
    // Metadata v12 with a flexible header: still answered with ApiVersions.
    let request = RequestFrame::new(3, 12, 99)
        .client_id("meta")
        .flexible()
        .body([0x01, 0x02])
        .encode();
    let run = drive_connection(Router::new(), ConnectionOptions::default(), vec![request])
        .await
        .expect("drive connection");
    let responses = parse_api_versions_frames(&run.output).expect("parse responses");
    assert_eq!(responses[0].correlation_id, 99);
    assert_eq!(responses[0].error_code, 0);
}

#[tokio::test]
async fn mixed_header_encodings_on_one_connection() {
    let frames = vec![
        RequestFrame::api_versions(0, 1).client_id("old").encode(),
        RequestFrame::api_versions(3, 2)
            .client_id("new")
            .tagged_field(0, b"x".to_vec())
            .encode(),
        RequestFrame::api_versions(4, 3).encode(),
    ];
    let run = drive_connection(Router::new(), ConnectionOptions::default(), frames)
        .await
        .expect("drive connection");
    assert_eq!(run.result.expect("clean close"), 3);
    let ids: Vec<i32> = parse_api_versions_frames(&run.output)
        .expect("parse responses")
        .iter()
        .map(|f| f.correlation_id)
        .collect();
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn frame_split_across_writes_is_reassembled() {
    let request = RequestFrame::api_versions(4, 5).client_id("test").encode();
    let (head, tail) = request.split_at(3);
    let run = drive_connection(
        Router::new(),
        ConnectionOptions::default(),
        vec![head.to_vec(), tail.to_vec()],
    )
    .await
    .expect("drive connection");
    assert_eq!(run.result.expect("clean close"), 1);
}

#[tokio::test]
async fn empty_connection_closes_cleanly() {
    let run = drive_connection(Router::new(), ConnectionOptions::default(), Vec::new())
        .await
        .expect("drive connection");
    assert_eq!(run.result.expect("clean close"), 0);
    assert!(run.output.is_empty());
}

#[rstest]
#[case::negative(length_prefix(-5).to_vec(), -5)]
#[case::oversized(length_prefix(10 * 1024 * 1024 + 1).to_vec(), 10 * 1024 * 1024 + 1)]
#[tokio::test]
async fn invalid_lengths_close_the_connection(#[case] frame: Vec<u8>, #[case] length: i32) {
    let run = drive_connection(Router::new(), ConnectionOptions::default(), vec![frame])
        .await
        .expect("drive connection");
    match run.result {
        Err(ConnectionError::Transport(TransportError::InvalidFrameLength { length: got, .. })) => {
            assert_eq!(got, length);
        }
        other => panic!("expected invalid frame length, got {other:?}"),
    }
    assert!(run.output.is_empty());
}

#[tokio::test]
async fn invalid_client_id_bytes_are_replaced() {
    let router = Router::new()
        .route(
            7,
            Arc::new(|req: &Request| {
                assert_eq!(req.header.client_id.as_deref(), Some("o\u{fffd}k"));
                Bytes::from_static(&[0x00, 0x00, 0x00, 0x00])
            }),
        )
        .expect("route 7 is free");
    let request = RequestFrame::new(7, 0, 8)
        .raw_client_id(vec![b'o', 0xff, b'k'])
        .encode();
    let run = drive_connection(router, ConnectionOptions::default(), vec![request])
        .await
        .expect("drive connection");
    assert_eq!(run.result.expect("clean close"), 1);
    assert_eq!(run.output, [0x00, 0x00, 0x00, 0x00]);
}

#[tokio::test]
async fn version_aware_strategy_accepts_flexible_v4() {
    let options = ConnectionOptions::default().with_header_strategy(HeaderStrategy::VersionAware);
    let request = RequestFrame::api_versions(4, 6).flexible().encode();
    let run = drive_connection(Router::new(), options, vec![request])
        .await
        .expect("drive connection");
    assert_eq!(run.result.expect("clean close"), 1);
    assert_eq!(
        parse_api_versions_frames(&run.output).expect("parse")[0].correlation_id,
        6
    );
}

#[rstest]
#[tokio::test]
async fn malformed_header_is_logged_as_warning(mut logger: LoggerHandle) {
    let (mut client, server) = duplex(256);
    let task = tokio::spawn(async move {
        handle_connection(server, None, &Router::new(), ConnectionOptions::default()).await;
    });
    // Payload holds only the api key.
    client
        .write_all(&[0x00, 0x00, 0x00, 0x02, 0x00, 0x12])
        .await
        .expect("write request");
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.expect("read until close");
    task.await.expect("join connection task");
    assert!(out.is_empty());

    let warnings = logger.drain_level(Level::Warn);
    assert!(
        warnings
            .iter()
            .any(|m| m.contains("kind=malformed_header") && m.contains("api_version")),
        "missing malformed header warning: {warnings:?}"
    );
}
