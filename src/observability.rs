//! Logging and metrics initialization.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize the tracing subscriber and register metric descriptions.
///
/// `RUST_LOG` wins over the configured log level when set. Safe to call once
/// per process; a second call fails because a global subscriber is already
/// installed.
pub fn init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.json_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()?;
    }

    metrics::register_metrics();
    Ok(())
}

/// Metrics registry and helpers.
pub mod metrics {
    use metrics::describe_counter;

    /// Register all metric descriptions.
    pub fn register_metrics() {
        describe_counter!(
            "signpost_errors_total",
            "Total number of errors constructed, by code and category"
        );
        describe_counter!(
            "signpost_enrichment_total",
            "Total number of finished enrichment tasks, by outcome"
        );
    }
}
