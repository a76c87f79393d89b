//! Process signal handling

use tracing::{error, info};

/// Resolves on the first SIGTERM, SIGINT or SIGHUP.
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint, mut sighup) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
        signal(SignalKind::hangup()),
    ) {
        (Ok(term), Ok(int), Ok(hup)) => (term, int, hup),
        _ => {
            error!("Failed to install signal handlers, falling back to Ctrl+C");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
        _ = sighup.recv() => info!("Received SIGHUP"),
    }
}

/// Resolves on Ctrl+C.
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
