//! Logging setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! application's call. With the `tracing-json` feature, [`init_json`] installs
//! a JSON formatter filtered by `RUST_LOG` (default `info`).

#[cfg(feature = "tracing-json")]
use tracing_subscriber::EnvFilter;

/// Install a global JSON subscriber.
///
/// Returns `false` if a global subscriber was already set.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(true)
        .try_init()
        .is_ok()
}
