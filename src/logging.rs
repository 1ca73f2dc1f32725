// ABOUTME: Tracing subscriber setup driven by the [logging] config section
// ABOUTME: Compact output on stderr by default, JSON lines when a log file is configured

use crate::config::{LogLevel, LoggingConfig};
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for this crate. `--verbose` forces debug.
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose {
        LogLevel::Debug
    } else {
        config.level
    };
    format!("fleetboot={}", level.as_str())
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(config, verbose)))
        .context("Failed to create log filter")?;

    match &config.file {
        Some(path) => init_file_logging(Path::new(path), env_filter),
        None => {
            init_stderr_logging(env_filter);
            Ok(())
        }
    }
}

fn init_stderr_logging(env_filter: EnvFilter) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn init_file_logging(log_path: &Path, env_filter: EnvFilter) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory: {}", parent.display())
            })?;
        }
    }
    let file = File::create(log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

    let fmt_layer = fmt::layer()
        .with_writer(file)
        .with_target(true)
        .with_ansi(false)
        .json();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_configured_level() {
        let config = LoggingConfig {
            level: LogLevel::Warn,
            file: None,
        };
        assert_eq!(filter_directive(&config, false), "fleetboot=warn");
    }

    #[test]
    fn test_verbose_overrides_level() {
        let config = LoggingConfig {
            level: LogLevel::Error,
            file: None,
        };
        assert_eq!(filter_directive(&config, true), "fleetboot=debug");
    }

    #[test]
    fn test_every_level_builds_a_filter() {
        for level in [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ] {
            let config = LoggingConfig { level, file: None };
            assert!(EnvFilter::try_new(filter_directive(&config, false)).is_ok());
        }
    }
}
