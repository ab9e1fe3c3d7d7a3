#![forbid(unsafe_code)]

//! Subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Install a global subscriber writing to stderr.
///
/// `RUST_LOG` wins over `level`. Repeated calls are ignored.
pub fn init(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if result.is_ok() {
        tracing::debug!(level, json, "logging initialized");
    }
}
