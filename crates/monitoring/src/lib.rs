//! Node sync monitoring.
//!
//! This crate turns `/status` snapshots into sync verdicts and drives the
//! edge-triggered alerting around them:
//!
//! - [`epoch`] tracks daily epoch boundaries, during which block production
//!   may pause without the node being out of sync.
//! - [`evaluator`] computes the verdict for one snapshot.
//! - [`alerting`] remembers the last notified verdict and raises an alert only
//!   on transitions.
//! - [`notifier`] delivers alerts (Slack-compatible webhook or no-op).
//! - [`driver`] runs the poll loop and publishes the status read by the
//!   health endpoint.
//! - [`metrics`] exposes Prometheus gauges and counters.
//!
//! ```no_run
//! use std::sync::Arc;
//! use syncmon_monitoring::{MonitorSettings, NoopNotifier, SyncMonitor};
//! use syncmon_rpc_client::StatusClient;
//!
//! # async fn run(settings: MonitorSettings, url: url::Url) -> Result<(), Box<dyn std::error::Error>> {
//! let client = StatusClient::new(&url, std::time::Duration::from_secs(5))?;
//! let monitor = SyncMonitor::new(settings, Arc::new(client), Arc::new(NoopNotifier));
//! let handle = monitor.spawn();
//! let status = handle.status();
//! println!("in sync: {}", status.is_in_sync().await);
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod alerting;
pub mod driver;
pub mod epoch;
pub mod evaluator;
pub mod metrics;
pub mod notifier;

pub use alerting::{Alert, AlertKind, SyncState};
pub use driver::{
    MonitorHandle, MonitorSettings, MonitorStatus, PollOutcome, SkipReason, StatusHandle,
    SyncMonitor,
};
pub use epoch::{EpochState, EpochTracker, EPOCH_PERIOD_HOURS};
pub use evaluator::{Evaluation, SyncEvaluator, Verdict};
pub use notifier::{NoopNotifier, Notifier, NotifyError, WebhookNotifier};
