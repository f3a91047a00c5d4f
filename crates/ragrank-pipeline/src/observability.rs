//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ragrank_core::config::ObservabilityConfig;

static INIT: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` takes precedence over
/// `config.log_level`. Later calls are no-ops.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // A subscriber installed by the host process wins.
        let _ = if config.json_logs {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_target(true).with_thread_ids(true).with_writer(std::io::stderr))
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(filter)
                .try_init()
        };
    });
}
