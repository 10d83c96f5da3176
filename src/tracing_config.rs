//! Tracing subscriber setup for the binary
//!
//! The library only emits trace events; subscriber configuration lives with
//! the application entry point.

use tracing_subscriber::EnvFilter;

/// Map `-v` count to an env-filter directive. An explicit `RUST_LOG` always
/// wins over the verbosity flag.
#[must_use]
pub fn filter_for_verbosity(verbosity: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = match verbosity {
        0 => "posecut=info,tower_http=warn",
        1 => "posecut=debug,tower_http=info",
        _ => "posecut=trace,tower_http=debug",
    };
    EnvFilter::new(directive)
}

/// Initialize the global tracing subscriber
pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for_verbosity(verbosity))
        .with_target(verbosity > 0)
        .init();
}
