//! Tracing subscriber setup
//!
//! The library crates only emit `tracing` events; the host installs a
//! subscriber once at startup with [`init_tracing`].
//!
//! `RUST_LOG` wins over the configured level when set. Token values are
//! never logged at any level.

use pca_domain::{LoggingConfig, PcaError, Result};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if set and valid, else `config.level`
///
/// # Errors
/// Returns `PcaError::Config` if `config.level` is not a valid directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| PcaError::Config(format!("Invalid log level '{}': {e}", config.level)))
}

/// Install the global `fmt` subscriber, text or JSON per `config.json`
///
/// # Errors
/// Returns `PcaError::Config` for an invalid level and `PcaError::Internal`
/// if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::fmt;

    let filter = build_filter(config)?;

    let result = if config.json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };
    result.map_err(|e| PcaError::Internal(format!("Failed to initialize tracing: {e}")))?;

    tracing::debug!(level = %config.level, json = config.json, "Tracing initialized");
    Ok(())
}
