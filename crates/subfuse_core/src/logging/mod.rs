//! Logging infrastructure for the synthesis pipeline.
//!
//! This module provides:
//! - Per-task loggers with file + shell-callback dual output
//! - Compact mode with progress filtering
//! - Tail buffer for ffmpeg error diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use subfuse_core::logging::{TaskLogger, LogConfig};
//!
//! let logger = TaskLogger::new("8f2c41", "/tmp/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Merge");
//! logger.command("ffmpeg -i input.mp4 ...");
//! logger.progress(50);
//! logger.success("Synthesis completed");
//! ```

mod task_logger;
mod types;

pub use task_logger::TaskLogger;
pub use types::{LogConfig, LogLevel, MessagePrefix, UiLogCallback};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber for application-wide logging.
///
/// Respects `RUST_LOG`, falling back to the provided default level, and
/// writes to stderr. Call once at startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

/// Initialize tracing with an additional daily-rolling file in `log_dir`.
///
/// Returns the appender guard; logging to the file stops when it is dropped,
/// so the caller must keep it alive for the process lifetime.
pub fn init_tracing_with_file(default_level: LogLevel, log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let file_appender = tracing_appender::rolling::daily(log_dir, "subfuse.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .init();

    guard
}
