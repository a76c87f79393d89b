//! End-to-End Pipeline Tests
//!
//! Parse a status document, evaluate it and feed the verdict into the alert
//! state machine, the way the poll loop does.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use sync_monitor::prelude::*;

fn epoch_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 18, 17, 0, 0).unwrap()
}

fn parse_document(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap()
}

fn body(height: u64, block_time: &str, catching_up: bool) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": -1,
        "result": {
            "node_info": {
                "protocol_version": { "p2p": "8", "block": "11", "app": "0" },
                "id": "4f1cd8a6e0ac2e6ab12b71a7d3c1a6ad5b3a5f2e",
                "network": "cosmoshub-4",
                "version": "0.34.14",
                "moniker": "sentry-0"
            },
            "sync_info": {
                "latest_block_hash": "1E5B0E5E1A2D8E0B1D38C6A1C8E9A3F45F9C1F0A3A18A2F2F7C5E1E3B3A1F0E1",
                "latest_app_hash": "AA",
                "latest_block_height": height.to_string(),
                "latest_block_time": block_time,
                "catching_up": catching_up
            }
        }
    })
    .to_string()
}

/// Test a node that stops producing blocks and recovers
#[test]
fn test_stall_and_recovery() {
    let evaluator = SyncEvaluator::new(std::time::Duration::from_secs(30));
    let mut epoch = EpochState::new(epoch_start());
    let mut state = SyncState::default();
    let now = epoch_start() + Duration::hours(2);

    let polls = [
        (body(100, "2021-06-18T18:59:50.123456789Z", false), now),
        (body(100, "2021-06-18T18:59:50.123456789Z", false), now + Duration::seconds(40)),
        (body(100, "2021-06-18T18:59:50.123456789Z", false), now + Duration::seconds(50)),
        (body(107, "2021-06-18T19:00:45Z", false), now + Duration::seconds(50)),
    ];

    let mut alerts = Vec::new();
    for (text, at) in polls {
        let doc = parse_document(&text);
        let status = parse_status(&doc).unwrap();
        assert_eq!(status.identity.moniker, "sentry-0");

        let evaluation = evaluator.evaluate(&status.snapshot, &epoch, at);
        epoch = evaluation.epoch;
        let in_sync = evaluation.verdict.in_sync().unwrap();
        let (next, alert) = state.apply(in_sync);
        state = next;
        if let Some(kind) = alert {
            alerts.push(Alert::new(kind, &status.identity, &status.snapshot));
        }
    }

    let kinds: Vec<_> = alerts.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![AlertKind::Recovered, AlertKind::Degraded, AlertKind::Recovered]
    );
    assert_eq!(alerts[1].block_height, 100);
    assert_eq!(alerts[2].block_height, 107);
    assert!(state.is_in_sync());
}

/// Test the pause around a daily epoch boundary
#[test]
fn test_epoch_boundary_pause() {
    let evaluator = SyncEvaluator::new(std::time::Duration::from_secs(30));
    let epoch = EpochState::new(epoch_start());

    // First block after the next boundary, then silence for three minutes.
    let doc = parse_document(&body(5000, "2021-06-19T17:00:02Z", false));
    let snapshot = parse_status(&doc).unwrap().snapshot;
    let at = Utc.with_ymd_and_hms(2021, 6, 19, 17, 3, 2).unwrap();

    let evaluation = evaluator.evaluate(&snapshot, &epoch, at);
    assert_eq!(evaluation.verdict, Verdict::EpochPause);
    assert_eq!(
        evaluation.epoch.epoch_boundary,
        epoch_start() + Duration::hours(24)
    );
}

/// Test that catch-up mode wins over a fresh block
#[test]
fn test_catching_up_node() {
    let evaluator = SyncEvaluator::new(std::time::Duration::from_secs(30));
    let epoch = EpochState::new(epoch_start());
    let doc = parse_document(&body(12, "2021-06-18T18:00:00Z", true));
    let snapshot = parse_status(&doc).unwrap().snapshot;

    let evaluation = evaluator.evaluate(
        &snapshot,
        &epoch,
        Utc.with_ymd_and_hms(2021, 6, 18, 18, 0, 1).unwrap(),
    );
    assert_eq!(evaluation.verdict, Verdict::CatchingUp);
    assert_eq!(SyncState::default().apply(false).1, Some(AlertKind::Degraded));
}
