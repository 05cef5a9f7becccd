//! Tracing subscriber setup for embedders and tests.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=flock_eval=debug`
/// (round outcomes, function calls) or `RUST_LOG=flock_eval=trace`
/// (misaligned neighbors).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
