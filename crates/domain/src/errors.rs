//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for PCA
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PcaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// The login redirect has been issued; nothing else should run on this page.
    #[error("Login required: {0}")]
    LoginRequired(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PcaError {
    /// Whether the error means the current page context is about to be
    /// replaced by the identity provider's login screen.
    #[must_use]
    pub const fn is_login_redirect(&self) -> bool {
        matches!(self, Self::LoginRequired(_))
    }
}

/// Result type alias for PCA operations
pub type Result<T> = std::result::Result<T, PcaError>;
