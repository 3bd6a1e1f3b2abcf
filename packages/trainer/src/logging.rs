//! Tracing setup for the `hanzi-srs` binary
//!
//! Events go to stderr so command output on stdout stays machine-readable.
//! With file logging on, a daily rolling `hanzi-srs.log` is written to the
//! configured log directory as well.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub const LOG_FILE_PREFIX: &str = "hanzi-srs.log";

/// Keeps the non-blocking file writer flushing until dropped
pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Filter from `RUST_LOG`, falling back to `info` when it does not parse
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn file_writer(log_dir: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(log_dir) {
        eprintln!("failed to create log directory {}: {err}", log_dir.display());
        return None;
    }
    let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}

/// Installs the global subscriber for one CLI run
pub fn init_tracing(config: &Config) -> Option<FileLogGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let file = config.log_dir.as_deref().and_then(file_writer);
    let registry = tracing_subscriber::registry()
        .with(env_filter(&config.log_level))
        .with(stderr_layer);

    match file {
        Some((writer, guard)) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            registry.with(file_layer).init();
            Some(FileLogGuard { _guard: guard })
        }
        None => {
            registry.init();
            None
        }
    }
}
