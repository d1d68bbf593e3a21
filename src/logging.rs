//! Logging initialisation.
//!
//! The library only emits `tracing` events; binaries and tests pick a
//! subscriber with these helpers.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the default subscriber.
///
/// The filter is read from `RUST_LOG` (default `info`), e.g.
/// `RUST_LOG=u_roster=debug` to see per-pass solver output.
///
/// # Example
/// ```no_run
/// u_roster::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Installs a `debug` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
