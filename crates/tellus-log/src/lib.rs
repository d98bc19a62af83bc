//! Structured logging setup for the planet generator tools.
//!
//! Console output via the `tracing` ecosystem: uptime timestamps, module
//! targets, severity levels, and `RUST_LOG`-overridable filtering. Slice
//! overrun warnings from the scheduler and per-phase generator logs all
//! flow through here.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber.
///
/// `default_filter` applies when `RUST_LOG` is unset, e.g. `"info"` or
/// `"info,tellus_planet=debug"`. Call once at startup; later calls are
/// ignored so tests and embedding hosts can race safely.
pub fn init_logging(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}
