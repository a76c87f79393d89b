//! Poll loop driver.
//!
//! [`SyncMonitor`] owns all mutable monitor state and is driven by a single
//! task: fetch, parse, evaluate, apply alert logic, notify, sleep. Readers
//! (the health server) only see the [`StatusHandle`] it publishes to.

use crate::alerting::{Alert, AlertKind, SyncState};
use crate::epoch::EpochState;
use crate::evaluator::{SyncEvaluator, Verdict};
use crate::metrics;
use crate::notifier::Notifier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use syncmon_config::MonitorConfig;
use syncmon_core::{parse_snapshot, parse_status, NodeIdentity, NodeStatus, StatusSnapshot};
use syncmon_rpc_client::StatusSource;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const SHUTDOWN_CHANNEL_SIZE: usize = 1;
/// Epoch windows longer than this are still honoured but logged as warnings.
const LONG_EPOCH_PAUSE_MINS: i64 = 60;

/// Timing settings of the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Sleep between polls.
    pub check_interval: Duration,
    /// Maximum block age still considered in sync.
    pub new_block_threshold: Duration,
    /// Anchor of the epoch boundaries.
    pub epoch_start_time: DateTime<Utc>,
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            check_interval: config.check_interval,
            new_block_threshold: config.new_block_threshold,
            epoch_start_time: config.epoch_start_time,
        }
    }
}

/// Read-only view published after each poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStatus {
    /// Latest verdict; `None` until the first evaluation.
    pub in_sync: Option<bool>,
    pub node: Option<NodeIdentity>,
    pub latest: Option<StatusSnapshot>,
    pub epoch_active: bool,
    pub last_poll: Option<DateTime<Utc>>,
    /// Polls whose height was lower than the previous evaluated one.
    pub height_regressions: u64,
}

impl MonitorStatus {
    /// Unknown counts as not in sync.
    pub fn is_in_sync(&self) -> bool {
        self.in_sync == Some(true)
    }
}

/// Shared handle to the published [`MonitorStatus`].
#[derive(Debug, Clone, Default)]
pub struct StatusHandle {
    inner: Arc<RwLock<MonitorStatus>>,
}

impl StatusHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current status.
    pub async fn snapshot(&self) -> MonitorStatus {
        self.inner.read().await.clone()
    }

    pub async fn is_in_sync(&self) -> bool {
        self.inner.read().await.is_in_sync()
    }

    async fn publish(&self, status: MonitorStatus) {
        *self.inner.write().await = status;
    }
}

/// Why a poll did not reach evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Fetch,
    Parse,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A snapshot was evaluated. `alert` is set when a transition was raised.
    Evaluated {
        verdict: Verdict,
        alert: Option<AlertKind>,
    },
    /// Fetch or parse failed; prior state retained.
    Skipped(SkipReason),
}

/// The sync monitor and its state.
pub struct SyncMonitor {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    evaluator: SyncEvaluator,
    check_interval: Duration,
    epoch: EpochState,
    sync: SyncState,
    identity: Option<NodeIdentity>,
    last_snapshot: Option<StatusSnapshot>,
    height_regressions: u64,
    status: StatusHandle,
}

impl SyncMonitor {
    pub fn new(
        settings: MonitorSettings,
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            notifier,
            evaluator: SyncEvaluator::new(settings.new_block_threshold),
            check_interval: settings.check_interval,
            epoch: EpochState::new(settings.epoch_start_time),
            sync: SyncState::default(),
            identity: None,
            last_snapshot: None,
            height_regressions: 0,
            status: StatusHandle::new(),
        }
    }

    /// Handle readers use to observe the published status.
    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Committed alerting state.
    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    /// Epoch window state carried between polls.
    pub fn epoch_state(&self) -> &EpochState {
        &self.epoch
    }

    /// Node identity, set by the first fully parsed document.
    pub fn identity(&self) -> Option<&NodeIdentity> {
        self.identity.as_ref()
    }

    /// Number of height regressions seen since start.
    pub fn height_regressions(&self) -> u64 {
        self.height_regressions
    }

    /// Runs one poll cycle at the current wall-clock time.
    pub async fn poll_once(&mut self) -> PollOutcome {
        self.poll_once_at(Utc::now()).await
    }

    /// Runs one poll cycle, evaluating block age against `now`.
    pub async fn poll_once_at(&mut self, now: DateTime<Utc>) -> PollOutcome {
        let endpoint = self.source.endpoint();

        let doc = match self.source.fetch_status().await {
            Ok(doc) => doc,
            Err(e) => {
                metrics::inc_fetch_errors();
                error!(rpc = %endpoint, error = %e, "status fetch failed");
                return PollOutcome::Skipped(SkipReason::Fetch);
            }
        };

        let parsed = if self.identity.is_none() {
            parse_status(&doc).map(|NodeStatus { snapshot, identity }| {
                info!(
                    rpc = %endpoint,
                    moniker = %identity.moniker,
                    node_id = %identity.node_id,
                    network = %identity.network,
                    "node identified"
                );
                self.identity = Some(identity);
                snapshot
            })
        } else {
            parse_snapshot(&doc)
        };

        let snapshot = match parsed {
            Ok(snapshot) => snapshot,
            Err(e) => {
                metrics::inc_parse_errors();
                error!(rpc = %endpoint, error = %e, "unable to parse status document");
                return PollOutcome::Skipped(SkipReason::Parse);
            }
        };

        if let Some(previous) = &self.last_snapshot {
            if snapshot.regressed_from(previous) {
                self.height_regressions += 1;
                metrics::inc_height_regressions();
                warn!(
                    rpc = %endpoint,
                    previous = previous.block_height,
                    current = snapshot.block_height,
                    "block height went backwards"
                );
            }
        }

        let evaluation = self.evaluator.evaluate(&snapshot, &self.epoch, now);
        self.epoch = evaluation.epoch;
        let age_secs = evaluation
            .block_age
            .map(|age| age.num_milliseconds() as f64 / 1000.0);
        metrics::record_snapshot(snapshot.block_height, age_secs);
        metrics::set_epoch_active(self.epoch.is_epoch);

        let verdict = evaluation.verdict;
        let alert = match verdict.in_sync() {
            None => {
                let paused_for = self
                    .epoch
                    .window_open_for(now)
                    .unwrap_or_else(chrono::Duration::zero);
                if paused_for > chrono::Duration::minutes(LONG_EPOCH_PAUSE_MINS) {
                    warn!(
                        rpc = %endpoint,
                        height = snapshot.block_height,
                        boundary = %self.epoch.epoch_boundary,
                        paused_mins = paused_for.num_minutes(),
                        "epoch window still open, block height has not advanced"
                    );
                } else {
                    info!(
                        rpc = %endpoint,
                        height = snapshot.block_height,
                        boundary = %self.epoch.epoch_boundary,
                        elapsed_secs = age_secs.unwrap_or_default(),
                        "⏸️ epoch boundary, waiting for block production to resume"
                    );
                }
                None
            }
            Some(in_sync) => {
                log_verdict(&endpoint, verdict, &snapshot, age_secs);
                let (next, alert) = self.sync.apply(in_sync);
                self.sync = next;
                metrics::set_in_sync(self.sync.in_sync);
                alert
            }
        };

        self.status
            .publish(MonitorStatus {
                in_sync: self.sync.in_sync,
                node: self.identity.clone(),
                latest: Some(snapshot.clone()),
                epoch_active: self.epoch.is_epoch,
                last_poll: Some(now),
                height_regressions: self.height_regressions,
            })
            .await;

        if let (Some(kind), Some(node)) = (alert, self.identity.as_ref()) {
            self.send_alert(Alert::new(kind, node, &snapshot)).await;
        }

        self.last_snapshot = Some(snapshot);
        PollOutcome::Evaluated { verdict, alert }
    }

    async fn send_alert(&self, alert: Alert) {
        match self.notifier.notify(&alert).await {
            Ok(()) => {
                metrics::inc_alerts_sent(alert.kind);
                info!(
                    kind = %alert.kind,
                    notifier = self.notifier.name(),
                    height = alert.block_height,
                    "🚨 alert sent"
                );
            }
            Err(e) => {
                metrics::inc_alert_failures();
                error!(
                    kind = %alert.kind,
                    notifier = self.notifier.name(),
                    error = %e,
                    "alert delivery failed"
                );
            }
        }
    }

    /// Polls until `shutdown` fires or its sender is dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            rpc = %self.source.endpoint(),
            interval_secs = self.check_interval.as_secs(),
            threshold_secs = self.evaluator.threshold().num_seconds(),
            "🛸 starting sync monitor"
        );

        loop {
            tokio::select! {
                outcome = self.poll_once() => {
                    debug!(?outcome, "poll finished");
                }
                _ = shutdown.recv() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.check_interval) => {}
                _ = shutdown.recv() => break,
            }
        }

        info!("sync monitor stopped");
    }

    /// Spawns the poll loop on the current runtime.
    pub fn spawn(self) -> MonitorHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(SHUTDOWN_CHANNEL_SIZE);
        let status = self.status_handle();
        let task = tokio::spawn(self.run(shutdown_rx));

        MonitorHandle {
            shutdown_tx,
            task,
            status,
        }
    }
}

fn log_verdict(endpoint: &str, verdict: Verdict, snapshot: &StatusSnapshot, age_secs: Option<f64>) {
    match verdict {
        Verdict::InSync => info!(
            rpc = %endpoint,
            height = snapshot.block_height,
            elapsed_secs = age_secs.unwrap_or_default(),
            "✅ in sync"
        ),
        Verdict::CatchingUp => info!(
            rpc = %endpoint,
            height = snapshot.block_height,
            "🚫 not in sync [🏃 catching up]"
        ),
        Verdict::Stale => error!(
            rpc = %endpoint,
            height = snapshot.block_height,
            elapsed_secs = age_secs.unwrap_or_default(),
            "🚫 not in sync"
        ),
        Verdict::EpochPause => {}
    }
}

/// Running monitor task.
pub struct MonitorHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
    status: StatusHandle,
}

impl MonitorHandle {
    pub fn status(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Signals the loop to stop and waits for it.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        let _ = self.shutdown_tx.send(());
        self.task.await
    }
}
