//! Global tracing subscriber management.
//!
//! Wires `log::` macros (sqlx, sea-orm internals) into the tracing pipeline
//! and installs a formatting subscriber according to the configured level
//! and format. Initialization is guarded so tests that build the stack
//! repeatedly do not race on the global subscriber.

use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::AppConfig;

static TELEMETRY_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize global tracing/logging exactly once.
///
/// Failures are reported on stderr and leave any previously installed
/// subscriber in effect; a service that cannot log structured events is
/// still allowed to serve.
pub fn init_tracing(config: &AppConfig) {
    if TELEMETRY_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return;
    }

    if let Err(err) = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init()
    {
        eprintln!(
            "Warning: failed to install log tracer bridge: {}. `log::` macros will not emit tracing events.",
            err
        );
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = match config.log_format.as_str() {
        "pretty" => fmt::layer().pretty().boxed(),
        _ => fmt::layer().json().boxed(),
    };

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
    {
        eprintln!(
            "Warning: failed to set global tracing subscriber: {}. Default subscriber remains in effect.",
            err
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_a_no_op() {
        let config = AppConfig::default();
        init_tracing(&config);
        init_tracing(&config);
        assert!(TELEMETRY_INITIALIZED.load(Ordering::SeqCst));
    }
}
