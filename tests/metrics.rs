#![cfg(feature = "metrics")]
//! Tests for `brokerwire` metrics helpers.
//!
//! These tests verify that counters and gauges update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.

use brokerwire::{
    config::ConnectionOptions,
    connection::handle_connection,
    dispatch::Router,
    metrics::{
        CONNECTION_PANICS,
        CONNECTIONS_ACTIVE,
        ConnectionGauge,
        Direction,
        ERRORS_TOTAL,
        FRAMES_PROCESSED,
        inc_connection_panics,
        inc_errors,
        inc_frames,
    },
};
use brokerwire_testing::RequestFrame;
use metrics::{SharedString, Unit};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};
use rstest::rstest;
use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

type SnapshotEntry = (CompositeKey, Option<Unit>, Option<SharedString>, DebugValue);

/// Take one snapshot; counters are read from it so repeated lookups agree.
fn snapshot(snapshotter: &Snapshotter) -> Vec<SnapshotEntry> { snapshotter.snapshot().into_vec() }

fn counter_value(entries: &[SnapshotEntry], name: &str, label: Option<(&str, &str)>) -> u64 {
    entries
        .iter()
        .filter(|(k, _, _, _)| {
            k.key().name() == name
                && label.is_none_or(|(lk, lv)| {
                    k.key().labels().any(|l| l.key() == lk && l.value() == lv)
                })
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(c) => *c,
            _ => 0,
        })
        .sum()
}

#[rstest]
#[case(Direction::Inbound, "inbound")]
#[case(Direction::Outbound, "outbound")]
fn frame_metric_is_labelled_by_direction(#[case] direction: Direction, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || inc_frames(direction));
    assert_eq!(
        counter_value(&snapshot(&snapshotter), FRAMES_PROCESSED, Some(("direction", label))),
        1
    );
}

#[test]
fn error_metric_is_labelled_by_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        inc_errors("truncated_frame");
        inc_errors("truncated_frame");
        inc_errors("malformed_header");
    });
    let entries = snapshot(&snapshotter);
    assert_eq!(
        counter_value(&entries, ERRORS_TOTAL, Some(("kind", "truncated_frame"))),
        2
    );
    assert_eq!(counter_value(&entries, ERRORS_TOTAL, None), 3);
}

#[rstest]
#[case(1)]
#[case(2)]
fn inc_connection_panics_counts(#[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        (0..expected).for_each(|_| inc_connection_panics());
    });
    assert_eq!(
        counter_value(&snapshot(&snapshotter), CONNECTION_PANICS, None),
        expected
    );
}

#[test]
fn connection_gauge_is_balanced() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let outer = ConnectionGauge::acquire();
        drop(ConnectionGauge::acquire());
        drop(outer);
    });
    let gauge = snapshot(&snapshotter)
        .into_iter()
        .find(|(k, _, _, _)| k.key().name() == CONNECTIONS_ACTIVE)
        .map(|(_, _, _, v)| v);
    assert!(matches!(gauge, Some(DebugValue::Gauge(g)) if g.into_inner().abs() < f64::EPSILON));
}

#[test]
fn connection_records_frames_and_errors() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime");

    metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let (mut client, server) = duplex(1024);
            let router = Router::new();
            let serve = handle_connection(server, None, &router, ConnectionOptions::default());
            let drive = async move {
                let mut input = RequestFrame::api_versions(4, 1).encode();
                input.extend_from_slice(&RequestFrame::api_versions(4, 2).encode());
                // Truncated third frame.
                input.extend_from_slice(&[0x00, 0x00, 0x00, 0x09, 0x00]);
                client.write_all(&input).await.expect("write input");
                client.shutdown().await.expect("shutdown");
                let mut out = Vec::new();
                client.read_to_end(&mut out).await.expect("read output");
            };
            tokio::join!(serve, drive);
        });
    });

    let entries = snapshot(&snapshotter);
    assert_eq!(
        counter_value(&entries, FRAMES_PROCESSED, Some(("direction", "inbound"))),
        2
    );
    assert_eq!(
        counter_value(&entries, FRAMES_PROCESSED, Some(("direction", "outbound"))),
        2
    );
    assert_eq!(
        counter_value(&entries, ERRORS_TOTAL, Some(("kind", "truncated_frame"))),
        1
    );
}
