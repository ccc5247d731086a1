//! Diagnostic logging via `tracing`.
//!
//! Diagnostics always go to stderr so stdout stays parseable. The filter is
//! taken from `FMIXC_LOG` when set, otherwise from `[logging] level`.
//! Data-quality findings are not logged here; they flow through the
//! reporter sinks in [`crate::report`].

use anyhow::{anyhow, Result};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

pub const LOG_ENV: &str = "FMIXC_LOG";

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var(LOG_ENV) {
        if !directives.trim().is_empty() {
            return EnvFilter::try_new(directives)
                .map_err(|e| anyhow!("Invalid {} directives: {}", LOG_ENV, e));
        }
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| anyhow!("Invalid logging.level '{}': {}", config.level, e))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config)?;
    let base = Registry::default().with(filter);

    let installed = if config.format == "json" {
        base.with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .try_init()
    } else {
        base.with(
            fmt::layer()
                .with_target(false)
                .with_ansi(atty::is(atty::Stream::Stderr))
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
