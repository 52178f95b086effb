use std::fs::OpenOptions;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Env var holding the filter directives (`info`, `annotator_core=debug`, ...)
pub const LOG_FILTER_ENV: &str = "ANNOTATOR_LOG";

/// Env var enabling an additional debug-level file log
pub const LOG_FILE_ENV: &str = "ANNOTATOR_LOG_FILE";

pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Install the global subscriber: stderr output filtered by `ANNOTATOR_LOG`
/// (falling back to `default_filter`), plus a file layer when
/// `ANNOTATOR_LOG_FILE` is set. Calling it twice is a no-op.
pub fn init_tracing_with_default(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let registry = tracing_subscriber::registry().with(stderr_layer);

    let file_layer = std::env::var(LOG_FILE_ENV).ok().and_then(|log_path| {
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_filter(tracing_subscriber::filter::LevelFilter::DEBUG),
            ),
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", log_path, e);
                None
            }
        }
    });

    if registry.with(file_layer).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
