//! Sync monitor service.
//!
//! Wires the configuration, the status client, the notifier, the poll loop
//! and the health endpoint into one process.

pub mod cli;
pub mod health;
pub mod logging;
pub mod shutdown;

pub use cli::Cli;

use anyhow::Context;
use std::future::Future;
use std::sync::Arc;
use syncmon_config::MonitorConfig;
use syncmon_monitoring::{
    MonitorSettings, NoopNotifier, Notifier, SyncMonitor, WebhookNotifier,
};
use syncmon_rpc_client::StatusClient;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Builds the notifier for the configured target.
pub fn build_notifier(config: &MonitorConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    match &config.notifier_target {
        Some(url) => {
            let notifier = WebhookNotifier::new(url.clone(), config.request_timeout)
                .context("failed to build webhook notifier")?;
            Ok(Arc::new(notifier))
        }
        None => {
            warn!("no notifier target configured, alerts will only be logged");
            Ok(Arc::new(NoopNotifier))
        }
    }
}

/// Runs the monitor and the health endpoint until `shutdown` resolves or the
/// health endpoint fails.
pub async fn run<F>(config: MonitorConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    info!(
        rpc = %config.rpc,
        epoch_start_time = %config.epoch_start_time.to_rfc3339(),
        check_interval_secs = config.check_interval.as_secs(),
        new_block_threshold_secs = config.new_block_threshold.as_secs(),
        request_timeout_secs = config.request_timeout.as_secs(),
        alerts = config.notifier_target.is_some(),
        listen = %config.listen,
        "sync-monitor {} starting",
        env!("CARGO_PKG_VERSION")
    );

    let client = StatusClient::new(&config.rpc, config.request_timeout)
        .context("failed to build status client")?;
    let notifier = build_notifier(&config)?;

    let monitor = SyncMonitor::new(MonitorSettings::from(&config), Arc::new(client), notifier);
    let monitor = monitor.spawn();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(health::serve_health(
        config.listen,
        monitor.status(),
        async {
            let _ = stop_rx.await;
        },
    ));

    let early_exit = tokio::select! {
        _ = shutdown => {
            info!("Shutdown signal received, stopping");
            None
        }
        served = &mut server => Some(served),
    };

    let _ = stop_tx.send(());
    monitor.shutdown().await.context("monitor task failed")?;

    let served = match early_exit {
        Some(served) => served,
        None => server.await,
    };
    served.context("health endpoint task failed")??;

    info!("sync-monitor stopped");
    Ok(())
}
