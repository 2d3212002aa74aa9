//! Tracing setup for hosts embedding the engine.
//!
//! The engine only emits `tracing` events under its own crate target;
//! installing a subscriber is up to the host. `init_tracing` is the stock
//! setup: engine events at the requested level, everything else at `warn`,
//! on stdout plus an optional daily rolling file.

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const ENGINE_TARGET: &str = env!("CARGO_CRATE_NAME");

pub struct FileLogGuard {
    _guard: WorkerGuard,
}

pub fn file_logging_enabled() -> bool {
    std::env::var("ENABLE_FILE_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// A bare level ("debug") applies to engine events only; a full directive
/// string ("info,danci_mastery=trace") is used as is.
pub fn filter_directive(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("warn,{ENGINE_TARGET}={level}")
    }
}

/// Filter for `log_level`, falling back to engine `info` when it doesn't parse
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{ENGINE_TARGET}=info")))
}

fn file_writer() -> Option<(NonBlocking, WorkerGuard)> {
    if !file_logging_enabled() {
        return None;
    }
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
    if let Err(err) = std::fs::create_dir_all(&log_dir) {
        eprintln!("failed to create log directory {log_dir}: {err}");
        return None;
    }
    let appender =
        RollingFileAppender::new(Rotation::DAILY, &log_dir, format!("{ENGINE_TARGET}.log"));
    Some(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber. Returns the file writer guard when file
/// logging is on; keep it alive for the lifetime of the process. A
/// subscriber that is already installed is left in place.
pub fn init_tracing(log_level: &str) -> Option<FileLogGuard> {
    let (file_layer, guard) = match file_writer() {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)),
            Some(guard),
        ),
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .is_ok();

    guard
        .filter(|_| installed)
        .map(|guard| FileLogGuard { _guard: guard })
}
