//! Configuration structures
//!
//! Loaded by `pca_infra::config::loader` from the environment or a TOML/JSON
//! file. Defaults only exist for the logging section; the identity provider
//! settings are always required.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{PcaError, Result};

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Identity provider and application URLs
    pub auth: AuthConfig,
    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Check every section for missing or malformed values.
    ///
    /// # Errors
    /// Returns `PcaError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;
        self.logging.validate()
    }
}

/// Identity provider settings
///
/// `uri` is the hosted identity provider base (the login page and the
/// `/oauth2/token` endpoint hang off it). `web_uri` is this application's own
/// base URL; it is sent as `redirect_uri` and must match what was registered
/// with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider base URI (e.g. `https://pca.auth.us-east-1.amazoncognito.com`)
    pub uri: String,

    /// OAuth client ID registered for this application
    pub client_id: String,

    /// Application base URL, origin plus trailing slash (e.g. `https://app.example.com/`)
    pub web_uri: String,
}

impl AuthConfig {
    /// Create a new auth configuration
    #[must_use]
    pub fn new(
        uri: impl Into<String>,
        client_id: impl Into<String>,
        web_uri: impl Into<String>,
    ) -> Self {
        Self { uri: uri.into(), client_id: client_id.into(), web_uri: web_uri.into() }
    }

    /// Validate that all fields are present and both URIs are absolute.
    ///
    /// # Errors
    /// Returns `PcaError::Config` if a field is empty or a URI does not parse.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(PcaError::Config("auth.client_id must not be empty".to_string()));
        }
        parse_absolute("auth.uri", &self.uri)?;
        parse_absolute("auth.web_uri", &self.web_uri)?;
        Ok(())
    }
}

fn parse_absolute(field: &str, value: &str) -> Result<Url> {
    if value.trim().is_empty() {
        return Err(PcaError::Config(format!("{field} must not be empty")));
    }
    let url = Url::parse(value)
        .map_err(|e| PcaError::Config(format!("{field} is not a valid URL: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(PcaError::Config(format!("{field} must be an absolute URL")));
    }
    Ok(url)
}

/// Logging settings consumed by `pca_infra::observability::init_tracing`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        if self.level.trim().is_empty() {
            return Err(PcaError::Config("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            auth: AuthConfig::new(
                "https://auth.example.com",
                "client123",
                "https://app.example.com/",
            ),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn empty_client_id_is_rejected() {
        let mut config = sample();
        config.auth.client_id = "  ".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, PcaError::Config(msg) if msg.contains("client_id")));
    }

    #[test]
    fn relative_uri_is_rejected() {
        let mut config = sample();
        config.auth.uri = "/login".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, PcaError::Config(msg) if msg.contains("auth.uri")));
    }

    #[test]
    fn empty_log_level_is_rejected() {
        let mut config = sample();
        config.logging.level = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn logging_section_is_optional() {
        let config: Config = toml::from_str(
            r#"
            [auth]
            uri = "https://auth.example.com"
            client_id = "abc"
            web_uri = "https://app.example.com/"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging, LoggingConfig::default());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }
}
