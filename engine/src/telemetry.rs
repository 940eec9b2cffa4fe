//! Telemetry and Observability
//!
//! Sets up `tracing-subscriber` for structured logging of the HTTP layer and
//! the engine. Debug builds print human-readable lines; release builds emit
//! JSON with the current span attached.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set
fn default_directive(log_level: &str) -> String {
    format!(
        "{level},roleplay_engine={level},tower_http={level}",
        level = log_level
    )
}

/// Initialize the tracing subscriber with the given log level.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter.
/// Only the first call installs a subscriber; later calls are no-ops.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level)));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    }
}
