use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable that turns on the debug log file
pub const LOG_FILE_ENV: &str = "PUBLISHING_OS_LOG_FILE";

/// Install the global subscriber.
///
/// Stderr gets human-readable output filtered by `RUST_LOG`, or
/// `default_directive` when `RUST_LOG` is unset. When `PUBLISHING_OS_LOG_FILE`
/// names a file, a second layer appends everything at DEBUG and above to it.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .context("invalid log filter")?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    if let Ok(log_path) = std::env::var(LOG_FILE_ENV) {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("failed to open log file {log_path}"))?;

        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG);

        registry
            .with(file_layer)
            .try_init()
            .context("tracing subscriber already installed")?;
        tracing::debug!(path = %log_path, "file logging enabled");
    } else {
        registry
            .try_init()
            .context("tracing subscriber already installed")?;
    }
    Ok(())
}
