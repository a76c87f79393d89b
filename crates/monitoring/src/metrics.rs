//! Prometheus metrics for the sync monitor.

use crate::alerting::AlertKind;
use lazy_static::lazy_static;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, Opts, TextEncoder};

fn register_gauge_best_effort(name: &str, help: &str) -> Gauge {
    let gauge = Gauge::new(name, help)
        .unwrap_or_else(|_| Gauge::new("syncmon_invalid_metric", "Invalid").unwrap());
    let _ = prometheus::register(Box::new(gauge.clone()));
    gauge
}

fn register_counter_best_effort(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help)
        .unwrap_or_else(|_| IntCounter::new("syncmon_invalid_counter", "Invalid").unwrap());
    let _ = prometheus::register(Box::new(counter.clone()));
    counter
}

lazy_static! {
    static ref IN_SYNC: Gauge = register_gauge_best_effort(
        "syncmon_in_sync",
        "1 when the node is in sync, 0 when not, -1 before the first verdict",
    );
    static ref BLOCK_HEIGHT: Gauge =
        register_gauge_best_effort("syncmon_block_height", "Latest block height reported by the node");
    static ref BLOCK_AGE: Gauge = register_gauge_best_effort(
        "syncmon_block_age_seconds",
        "Seconds between the latest block time and the last poll",
    );
    static ref EPOCH_ACTIVE: Gauge =
        register_gauge_best_effort("syncmon_epoch_active", "1 while inside an epoch window");
    static ref FETCH_ERRORS: IntCounter =
        register_counter_best_effort("syncmon_fetch_errors_total", "Failed status fetches");
    static ref PARSE_ERRORS: IntCounter =
        register_counter_best_effort("syncmon_parse_errors_total", "Unparseable status documents");
    static ref HEIGHT_REGRESSIONS: IntCounter = register_counter_best_effort(
        "syncmon_height_regressions_total",
        "Snapshots reporting a lower height than the previous one",
    );
    static ref ALERT_FAILURES: IntCounter =
        register_counter_best_effort("syncmon_alert_failures_total", "Alerts that could not be delivered");
    static ref ALERTS_SENT: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new("syncmon_alerts_total", "Alerts emitted by kind"),
            &["kind"],
        )
        .unwrap_or_else(|_| {
            IntCounterVec::new(Opts::new("syncmon_invalid_counter_vec", "Invalid"), &["kind"]).unwrap()
        });
        let _ = prometheus::register(Box::new(counter.clone()));
        counter
    };
}

/// Records the latest snapshot height and block age.
pub fn record_snapshot(block_height: u64, block_age_secs: Option<f64>) {
    BLOCK_HEIGHT.set(block_height as f64);
    if let Some(age) = block_age_secs {
        BLOCK_AGE.set(age);
    }
}

pub fn set_in_sync(in_sync: Option<bool>) {
    IN_SYNC.set(match in_sync {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => -1.0,
    });
}

pub fn set_epoch_active(active: bool) {
    EPOCH_ACTIVE.set(if active { 1.0 } else { 0.0 });
}

pub fn inc_fetch_errors() {
    FETCH_ERRORS.inc();
}

pub fn inc_parse_errors() {
    PARSE_ERRORS.inc();
}

pub fn inc_height_regressions() {
    HEIGHT_REGRESSIONS.inc();
}

pub fn inc_alerts_sent(kind: AlertKind) {
    ALERTS_SENT.with_label_values(&[kind.as_str()]).inc();
}

pub fn inc_alert_failures() {
    ALERT_FAILURES.inc();
}

/// Gathers all metrics in Prometheus text format.
pub fn gather() -> Vec<u8> {
    let _ = &*IN_SYNC;
    let _ = &*BLOCK_HEIGHT;
    let _ = &*BLOCK_AGE;
    let _ = &*EPOCH_ACTIVE;
    let _ = &*FETCH_ERRORS;
    let _ = &*PARSE_ERRORS;
    let _ = &*HEIGHT_REGRESSIONS;
    let _ = &*ALERT_FAILURES;
    let _ = &*ALERTS_SENT;

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap_or(());
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_exposes_monitor_metrics() {
        record_snapshot(42, Some(3.5));
        set_in_sync(Some(true));
        inc_alerts_sent(AlertKind::Recovered);

        let text = String::from_utf8(gather()).unwrap();
        assert!(text.contains("syncmon_block_height "));
        assert!(text.contains("syncmon_in_sync"));
        assert!(text.contains("syncmon_alerts_total{kind=\"recovered\"}"));
        assert!(text.contains("syncmon_fetch_errors_total"));
    }
}
