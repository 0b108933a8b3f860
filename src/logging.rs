//! File-based logging
//!
//! The TUI owns the terminal, so tracing output goes to daily rolling files
//! under the configured log directory instead of stdout.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "spotify-streamer";
const DEFAULT_FILTER: &str = "spotify_streamer=debug,warn";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/spotify-streamer.YYYY-MM-DD`. `RUST_LOG`
/// overrides the default filter. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(log_dir = %config.log_dir.display(), "Logging initialized");

    Ok(guard)
}
