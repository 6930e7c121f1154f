//! Shared tracing/logging initialization.
//!
//! Logs go to stderr so that command output on stdout stays machine-readable.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- filter used when `RUST_LOG` is unset or invalid
///   (e.g. `"shroud_core=info"`).
/// * `log_json` -- emit one JSON object per event instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let output = if log_json {
        fmt.json().boxed()
    } else {
        fmt.boxed()
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(output)
        .init();
}

/// Initialise tracing from the `logging` section of the configuration.
///
/// The configured level applies to the Shroud crates; everything else stays
/// at `warn`.
pub fn init_from_config(logging: &LoggingConfig) {
    init_tracing(&default_filter(&logging.level), logging.json);
}

fn default_filter(level: &str) -> String {
    format!("warn,shroud_cli={level},shroud_core={level},shroud_crypto={level}")
}
