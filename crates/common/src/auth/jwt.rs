//! JWT payload decoding
//!
//! Tokens are never verified here. The signature belongs to the protected API
//! to check; the client only reads `exp` to decide when to refresh and the
//! identity claims for display.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// JWT decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not three segments, or the payload is not base64url JSON of the
    /// expected shape
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Decode the payload segment of a compact JWT into `T`
///
/// # Errors
/// Returns `TokenError::InvalidToken` unless the token has exactly three
/// dot-separated segments and the middle one is base64url JSON matching `T`.
pub fn decode_payload<T: DeserializeOwned>(token: &str) -> Result<T, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::InvalidToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    // Some issuers pad; the URL-safe alphabet otherwise matches.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::InvalidToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::InvalidToken(format!("payload is not valid claims JSON: {e}")))
}

/// Claims the coordinator needs from an access token
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AccessClaims {
    /// Expiry, epoch seconds. Any JSON number is accepted, fractions included.
    pub exp: f64,
}

impl AccessClaims {
    /// Whether the token is still usable at `now` (epoch seconds)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_live_at(&self, now: i64) -> bool {
        (now as f64) < self.exp
    }
}

/// Display claims carried by the id token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityClaims {
    /// Subject identifier
    #[serde(default)]
    pub sub: Option<String>,
    /// Email address, when the provider includes it
    #[serde(default)]
    pub email: Option<String>,
    /// Login name under any of the usual claim names
    #[serde(default, alias = "cognito:username", alias = "preferred_username")]
    pub username: Option<String>,
}

impl IdentityClaims {
    /// Best label for the signed-in user
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.username.as_deref().or(self.email.as_deref()).or(self.sub.as_deref())
    }
}
