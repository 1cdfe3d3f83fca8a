//! Tracing subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber: env-filter plus a fmt layer.
/// `RUST_LOG` overrides the default filter.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "codingbit_api=debug,codingbit_db=debug,codingbit_storage=debug,codingbit_media=debug,tower_http=debug"
                .into()
        }))
        .with(fmt::layer())
        .init();
}
