//! Tracing configuration.
//!
//! Logs go to stdout through a compact formatter. `RUST_LOG` takes precedence over the
//! configured default filter.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber.
///
/// - Respects `RUST_LOG` for filtering, falling back to `default_filter`.
/// - Does nothing if a global subscriber is already installed.
pub fn init_tracing(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
