use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FILE_PREFIX: &str = "hanab-stats.log";

/// Sends `tracing` output to a daily-rolling file in `log_dir`.
///
/// The filter comes from `RUST_LOG`, falling back to `default_level`.
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init(log_dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    Ok(guard)
}
