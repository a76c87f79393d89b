//! Command line arguments.
//!
//! Every option can also be supplied through its environment variable. The
//! optional `--config` file is the lowest layer; flags and environment
//! variables override it.

use clap::Parser;
use std::path::PathBuf;
use syncmon_config::{ConfigResult, LogFormat, MonitorConfig, PartialConfig, PartialLogSettings};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "sync-monitor",
    version,
    about = "Watches a node's /status endpoint and alerts when it falls out of sync"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, short = 'c', env = "SYNC_MONITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the node RPC (e.g. http://localhost:26657)
    #[arg(long, env = "RPC_NODE")]
    pub rpc: Option<String>,

    /// Start of the most recent epoch (RFC 3339)
    #[arg(long, env = "LAST_EPOCH_START_TIME")]
    pub epoch_start_time: Option<String>,

    /// Seconds between polls
    #[arg(long, env = "CHECK_INTERVAL")]
    pub check_interval: Option<u64>,

    /// Maximum block age in seconds still considered in sync
    #[arg(long, env = "NEW_BLOCK_THRESHOLD")]
    pub new_block_threshold: Option<u64>,

    /// Slack-compatible webhook URL; alerts are only logged when unset
    #[arg(long, env = "SLACK_WEBHOOK")]
    pub notifier_target: Option<String>,

    /// Timeout in seconds for status and webhook requests
    #[arg(long, env = "REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Health endpoint bind address
    #[arg(long, env = "HEALTH_LISTEN")]
    pub listen: Option<String>,

    /// Log level or filter directive
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (text, compact, json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Configuration layer made of the flags and environment variables.
    pub fn layer(&self) -> PartialConfig {
        PartialConfig {
            rpc: self.rpc.clone(),
            epoch_start_time: self.epoch_start_time.clone(),
            check_interval: self.check_interval,
            new_block_threshold: self.new_block_threshold,
            notifier_target: self.notifier_target.clone(),
            request_timeout: self.request_timeout,
            listen: self.listen.clone(),
            log: PartialLogSettings {
                level: self.log_level.clone(),
                format: self.log_format,
            },
        }
    }

    /// Loads the config file (if any), overlays flags and validates the result.
    pub fn load_config(&self) -> ConfigResult<MonitorConfig> {
        let file = match &self.config {
            Some(path) => PartialConfig::load(path)?,
            None => PartialConfig::default(),
        };
        file.merge(self.layer()).resolve()
    }
}
