//! # sync-monitor
//!
//! Liveness and sync monitoring for Tendermint/CometBFT style node RPC
//! endpoints.
//!
//! The monitor polls `{rpc}/status`, decides whether the node is in sync from
//! the age of its latest block, tolerates the block production pause around
//! daily epoch boundaries, and raises an alert only when the verdict flips.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sync_monitor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PartialConfig {
//!         rpc: Some("http://localhost:26657".into()),
//!         epoch_start_time: Some("2021-06-18T17:00:00Z".into()),
//!         ..PartialConfig::default()
//!     }
//!     .resolve()?;
//!
//!     let client = StatusClient::new(&config.rpc, config.request_timeout)?;
//!     let monitor = SyncMonitor::new(
//!         MonitorSettings::from(&config),
//!         Arc::new(client),
//!         Arc::new(NoopNotifier),
//!     );
//!     let handle = monitor.spawn();
//!     println!("in sync: {}", handle.status().is_in_sync().await);
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`] - status document parsing and snapshot types
//! - [`config`] - layered configuration
//! - [`rpc_client`] - `/status` HTTP client
//! - [`monitoring`] - epoch tracking, sync evaluation, alerting and the poll loop
//!
//! The `sync-monitor` binary lives in the `syncmon-node` crate.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use syncmon_config as config;
pub use syncmon_core as core;
pub use syncmon_monitoring as monitoring;
pub use syncmon_rpc_client as rpc_client;

/// Common imports for embedding the monitor
pub mod prelude {
    pub use crate::config::{MonitorConfig, PartialConfig};
    pub use crate::core::{parse_status, NodeIdentity, StatusSnapshot};
    pub use crate::monitoring::{
        Alert, AlertKind, EpochState, MonitorSettings, NoopNotifier, Notifier, SyncEvaluator,
        SyncMonitor, SyncState, Verdict, WebhookNotifier,
    };
    pub use crate::rpc_client::{StatusClient, StatusSource};
}

/// Version of the monitor
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
