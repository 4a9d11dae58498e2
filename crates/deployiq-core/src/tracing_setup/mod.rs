//! Tracing initialization and span definitions.

pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static INIT: Once = Once::new();

/// Initialize the DeployIQ tracing/logging system.
///
/// Reads the `DEPLOYIQ_LOG` environment variable for per-crate log levels,
/// e.g. `DEPLOYIQ_LOG=deployiq_memory=debug,deployiq_storage=warn`.
/// Falls back to the configured level when `DEPLOYIQ_LOG` is unset or invalid.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("DEPLOYIQ_LOG")
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.json_logs {
            registry
                .with(fmt::layer().json().with_target(true).with_thread_ids(true))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
        // The host process may have installed its own subscriber first.
        if let Err(e) = result {
            eprintln!("deployiq: tracing subscriber not installed: {e}");
        }
    });
}
