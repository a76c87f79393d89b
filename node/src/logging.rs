//! Logging initialization

use anyhow::Context;
use syncmon_config::{LogFormat, LogSettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the filter for `level`. `RUST_LOG` takes precedence when set.
pub fn env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => parse_filter(level),
    }
}

/// Parses a level or filter directive such as `info` or `syncmon=debug,warn`.
pub fn parse_filter(level: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("invalid log level `{level}`"))
}

/// Installs the global subscriber.
pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = env_filter(&settings.level)?;

    match settings.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!(level = %settings.level, format = %settings.format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_and_directives() {
        for level in ["info", "debug", "warn", "syncmon_monitoring=trace,info"] {
            assert!(parse_filter(level).is_ok(), "{level}");
        }
    }

    #[test]
    fn rejects_garbage_level() {
        assert!(parse_filter("info,foo=notalevel").is_err());
    }
}
