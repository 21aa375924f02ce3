//! Structured logging with tracing
//!
//! Installs the process-wide `tracing-subscriber` registry: an `EnvFilter`
//! (from `DOCVAULT_LOG`, falling back to the configured level), a stdout
//! layer in text or JSON form and an optional daily-rolling file layer.

use crate::constants::{LOG_ENV_FILTER, LOG_FILE_STEM};
use docvault_domain::error::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{Level, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub use crate::config::LoggingConfig;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const LEVELS: [(&str, Level); 6] = [
    ("trace", Level::TRACE),
    ("debug", Level::DEBUG),
    ("info", Level::INFO),
    ("warn", Level::WARN),
    ("warning", Level::WARN),
    ("error", Level::ERROR),
];

/// Install the global subscriber
///
/// # Errors
/// `Configuration` if the level is unknown or a global subscriber is
/// already installed.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV_FILTER).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers = vec![stdout_layer(config.json_format)];
    if let Some(path) = &config.file_output {
        layers.push(file_layer(path, config.json_format));
    }

    Registry::default()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::configuration_with_source("Failed to install logging", e))?;

    info!(%level, json = config.json_format, "Logging initialized");
    Ok(())
}

fn stdout_layer(json: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);
    if json { layer.json().boxed() } else { layer.boxed() }
}

/// Daily-rolling file next to `path`, named after its stem
fn file_layer(path: &Path, json: bool) -> BoxedLayer {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem().unwrap_or_else(|| OsStr::new(LOG_FILE_STEM));
    let layer = fmt::layer()
        .with_writer(tracing_appender::rolling::daily(dir, stem))
        .with_ansi(false);
    if json { layer.json().boxed() } else { layer.boxed() }
}

/// Case-insensitive level name; `warning` is accepted for `warn`
pub fn parse_log_level(level: &str) -> Result<Level> {
    let wanted = level.trim();
    LEVELS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|&(_, level)| level)
        .ok_or_else(|| {
            Error::configuration(format!(
                "Unknown log level '{level}', expected trace, debug, info, warn or error"
            ))
        })
}
