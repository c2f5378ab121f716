//! Tracing setup.
//!
//! Logs go to stderr unless `logging.directory` is set, in which case they are
//! written to `<directory>/cadenza.YYYY-MM-DD.log` with daily rotation.
//! `RUST_LOG` overrides the configured filter.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;
use crate::error::{PlayerError, Result};

const LOG_FILE_PREFIX: &str = "cadenza";

/// Install the global subscriber. The returned guard flushes the file writer
/// on drop and must be kept alive until exit.
pub fn init_logging(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .map_err(|e| PlayerError::Logging(format!("bad filter {:?}: {e}", settings.filter)))?;

    let Some(dir) = settings.directory.as_ref() else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init()
            .map_err(|e| PlayerError::Logging(e.to_string()))?;
        return Ok(None);
    };

    fs::create_dir_all(dir)?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| PlayerError::Logging(e.to_string()))?;

    tracing::info!(directory = %dir.display(), "logging to files");
    Ok(Some(guard))
}
