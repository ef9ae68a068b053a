//! Logging setup
//!
//! JSON formatted tracing output on stderr, leaving stdout for the
//! rendered document.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Level used when the configured one cannot be parsed
const FALLBACK_LEVEL: &str = "warn";

/// Build the filter from RUST_LOG, falling back to the configured level
pub fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Initialize the global tracing subscriber
pub fn init_tracing(log_level: &str) {
    let console_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_filter(build_filter(log_level));

    tracing_subscriber::registry().with(console_layer).init();
}
