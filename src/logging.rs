//! # Logging
//!
//! `tracing` subscriber setup: human-readable output on stdout, plus a
//! daily-rolling file when a log directory is configured.
//!
//! `RUST_LOG` overrides the configured level when set.

use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Result, RoverBridgeError};

/// File name prefix of rolled log files (`rover-bridge.log.YYYY-MM-DD`).
pub const LOG_FILE_PREFIX: &str = "rover-bridge.log";

/// Filter from `RUST_LOG`, falling back to `level`.
#[must_use]
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole process.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(&config.level);
    let stdout = fmt::layer().with_target(true);

    match &config.directory {
        Some(directory) => {
            fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer().with_ansi(false).with_writer(writer);

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(file)
                .try_init()
                .map_err(|e| RoverBridgeError::Logging(e.to_string()))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .try_init()
                .map_err(|e| RoverBridgeError::Logging(e.to_string()))?;
            Ok(None)
        }
    }
}
