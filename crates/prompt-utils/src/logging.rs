//! Logging and tracing utilities
//!
//! Events go to stderr so command output on stdout stays machine-readable.

use crate::config::{Config, LogFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(&Config::default());
}

/// Initialize tracing from configuration
///
/// `RUST_LOG` wins over `config.log_level`; an invalid level falls back to
/// `info`. Calling this twice keeps the first subscriber.
pub fn init_tracing_with(config: &Config) {
    let registry = tracing_subscriber::registry().with(env_filter(&config.log_level));

    let result = match config.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if result.is_ok() {
        tracing::debug!(
            app = %config.app_name,
            environment = %config.environment,
            format = %config.log_format,
            "Tracing initialized"
        );
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
