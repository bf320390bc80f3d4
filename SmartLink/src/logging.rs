//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise the level comes from `log.min_level`.
//! The console layer writes to stderr and can be turned off with
//! `log.enable_console`.

use anyhow::{Result, anyhow};
use smlconfig::Config;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Filter directive derived from the configured minimum level
pub fn default_directive(config: &Config) -> Result<String> {
    let level = config.get_log_min_level()?.trim().to_lowercase();
    if LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(anyhow!("unknown log level in log.min_level: {level}"))
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(default_directive(config)?),
    };

    let console = config.get_log_enable_console()?.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .with_writer(std::io::stderr)
    });

    Registry::default()
        .with(filter)
        .with(console)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_from_config() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(default_directive(&config).unwrap(), "info");

        let config = Config::from_yaml_str("log:\n  min_level: DEBUG\n").unwrap();
        assert_eq!(default_directive(&config).unwrap(), "debug");

        let config = Config::from_yaml_str("log:\n  min_level: LOUD\n").unwrap();
        assert!(default_directive(&config).is_err());
    }
}
