//! Sync Monitor Configuration
//!
//! Configuration is assembled in layers: an optional TOML file, then command
//! line flags and environment variables. Every layer is a [`PartialConfig`];
//! layers are merged with [`PartialConfig::merge`] and turned into a validated
//! [`MonitorConfig`] with [`PartialConfig::resolve`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default poll period in seconds
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 10;
/// Default maximum block age in seconds before the node is reported out of sync
pub const DEFAULT_NEW_BLOCK_THRESHOLD_SECS: u64 = 30;
/// Default timeout for one status request in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
/// Default health server address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting `{0}`")]
    MissingField(&'static str),

    #[error("Invalid URL for `{field}` ({value}): {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid timestamp for `{field}` ({value}): {source}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid socket address for `{field}` ({value}): {source}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Compact single-line format
    Compact,
    /// JSON format for machine parsing
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Fully resolved monitor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Base URL of the node RPC; `/status` is appended
    pub rpc: Url,
    /// Start of the most recent epoch, anchor of the 24h boundaries
    pub epoch_start_time: DateTime<Utc>,
    /// Poll period
    pub check_interval: Duration,
    /// Maximum block age still considered in sync
    pub new_block_threshold: Duration,
    /// Incoming webhook for alerts; `None` disables alerting
    pub notifier_target: Option<Url>,
    /// Timeout for a single status request
    pub request_timeout: Duration,
    /// Health server listen address
    pub listen: SocketAddr,
    /// Logging settings
    pub log: LogSettings,
}

/// Partial log settings as found in one configuration layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialLogSettings {
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

/// One configuration layer; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    pub rpc: Option<String>,
    pub epoch_start_time: Option<String>,
    /// Seconds
    pub check_interval: Option<u64>,
    /// Seconds
    pub new_block_threshold: Option<u64>,
    pub notifier_target: Option<String>,
    /// Seconds
    pub request_timeout: Option<u64>,
    pub listen: Option<String>,
    pub log: PartialLogSettings,
}

impl PartialConfig {
    /// Parses a layer from TOML text.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads a layer from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&contents)
    }

    /// Overlays `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: PartialConfig) -> PartialConfig {
        PartialConfig {
            rpc: other.rpc.or(self.rpc),
            epoch_start_time: other.epoch_start_time.or(self.epoch_start_time),
            check_interval: other.check_interval.or(self.check_interval),
            new_block_threshold: other.new_block_threshold.or(self.new_block_threshold),
            notifier_target: other.notifier_target.or(self.notifier_target),
            request_timeout: other.request_timeout.or(self.request_timeout),
            listen: other.listen.or(self.listen),
            log: PartialLogSettings {
                level: other.log.level.or(self.log.level),
                format: other.log.format.or(self.log.format),
            },
        }
    }

    /// Applies defaults, enforces required settings and validates values.
    pub fn resolve(self) -> ConfigResult<MonitorConfig> {
        let rpc = non_empty(self.rpc).ok_or(ConfigError::MissingField("rpc"))?;
        let rpc = parse_http_url("rpc", &rpc)?;

        let epoch_start_time = non_empty(self.epoch_start_time)
            .ok_or(ConfigError::MissingField("epoch_start_time"))?;
        let epoch_start_time = DateTime::parse_from_rfc3339(epoch_start_time.trim())
            .map(|time| time.with_timezone(&Utc))
            .map_err(|source| ConfigError::InvalidTimestamp {
                field: "epoch_start_time",
                value: epoch_start_time.clone(),
                source,
            })?;

        let notifier_target = non_empty(self.notifier_target)
            .map(|target| parse_http_url("notifier_target", &target))
            .transpose()?;

        let listen = self
            .listen
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen = listen
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddress {
                field: "listen",
                value: listen.clone(),
                source,
            })?;

        let check_interval = positive_secs(
            "check_interval",
            self.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL_SECS),
        )?;
        let new_block_threshold = positive_secs(
            "new_block_threshold",
            self.new_block_threshold
                .unwrap_or(DEFAULT_NEW_BLOCK_THRESHOLD_SECS),
        )?;
        let request_timeout = positive_secs(
            "request_timeout",
            self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )?;

        let log = LogSettings {
            level: non_empty(self.log.level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format: self.log.format.unwrap_or_default(),
        };

        Ok(MonitorConfig {
            rpc,
            epoch_start_time,
            check_interval,
            new_block_threshold,
            notifier_target,
            request_timeout,
            listen,
            log,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_http_url(field: &'static str, value: &str) -> ConfigResult<Url> {
    let url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme `{}`", other),
        }),
    }
}

fn positive_secs(field: &'static str, secs: u64) -> ConfigResult<Duration> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than 0 seconds".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> PartialConfig {
        PartialConfig {
            rpc: Some("http://localhost:26657".into()),
            epoch_start_time: Some("2021-06-18T17:00:00Z".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_applied() {
        let config = minimal().resolve().unwrap();

        assert_eq!(config.check_interval, Duration::from_secs(10));
        assert_eq!(config.new_block_threshold, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.listen, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.notifier_target, None);
        assert_eq!(config.log, LogSettings::default());
        assert_eq!(config.epoch_start_time.to_rfc3339(), "2021-06-18T17:00:00+00:00");
    }

    #[test]
    fn rpc_and_epoch_start_are_required() {
        let mut partial = minimal();
        partial.rpc = None;
        assert!(matches!(partial.resolve(), Err(ConfigError::MissingField("rpc"))));

        let mut partial = minimal();
        partial.epoch_start_time = Some("  ".into());
        assert!(matches!(
            partial.resolve(),
            Err(ConfigError::MissingField("epoch_start_time"))
        ));
    }

    #[test]
    fn empty_notifier_disables_alerting() {
        let mut partial = minimal();
        partial.notifier_target = Some(String::new());
        assert_eq!(partial.resolve().unwrap().notifier_target, None);
    }

    #[test]
    fn rejects_invalid_values() {
        let mut partial = minimal();
        partial.check_interval = Some(0);
        assert!(matches!(
            partial.resolve(),
            Err(ConfigError::InvalidValue { field: "check_interval", .. })
        ));

        let mut partial = minimal();
        partial.rpc = Some("ftp://node".into());
        assert!(matches!(
            partial.resolve(),
            Err(ConfigError::InvalidValue { field: "rpc", .. })
        ));

        let mut partial = minimal();
        partial.epoch_start_time = Some("18/06/2021".into());
        assert!(matches!(
            partial.resolve(),
            Err(ConfigError::InvalidTimestamp { .. })
        ));

        let mut partial = minimal();
        partial.listen = Some("localhost".into());
        assert!(matches!(partial.resolve(), Err(ConfigError::InvalidAddress { .. })));
    }

    #[test]
    fn later_layers_win() {
        let file = PartialConfig {
            check_interval: Some(60),
            new_block_threshold: Some(90),
            log: PartialLogSettings {
                level: Some("debug".into()),
                format: Some(LogFormat::Json),
            },
            ..minimal()
        };
        let cli = PartialConfig {
            check_interval: Some(5),
            log: PartialLogSettings {
                level: Some("warn".into()),
                format: None,
            },
            ..Default::default()
        };

        let config = file.merge(cli).resolve().unwrap();
        assert_eq!(config.check_interval, Duration::from_secs(5));
        assert_eq!(config.new_block_threshold, Duration::from_secs(90));
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
