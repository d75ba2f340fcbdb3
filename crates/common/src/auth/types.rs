//! Session types and identity-provider endpoints
//!
//! Defines the token triple slots, the token endpoint response, and the URLs
//! derived from [`AuthConfig`].

use std::fmt;

use pca_domain::AuthConfig;
use serde::Deserialize;
use url::Url;

/// One of the three persisted credential slots
///
/// Each slot is stored independently; absence of [`TokenSlot::AccessToken`]
/// means "no active session".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSlot {
    /// Identity claims, used for display only
    IdToken,
    /// Bearer credential for the protected API
    AccessToken,
    /// Long-lived credential used only to obtain a new triple
    RefreshToken,
}

impl TokenSlot {
    /// All slots in write order
    pub const ALL: [Self; 3] = [Self::IdToken, Self::AccessToken, Self::RefreshToken];

    /// Storage key for this slot
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::IdToken => "id_token",
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Look a slot up by its storage key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.key() == key)
    }
}

impl fmt::Display for TokenSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Token endpoint grant types supported by the session core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantType {
    /// Exchange a one-time authorization code
    AuthorizationCode,
    /// Trade a refresh token for a new access token
    RefreshToken,
}

impl GrantType {
    /// Wire value for the `grant_type` form field
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful response from `POST {authUri}/oauth2/token`
///
/// `refresh_token` is optional: providers with non-rotating refresh tokens
/// omit it on refresh exchanges. Unknown fields are ignored.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    /// Identity token, for display only
    pub id_token: String,
    /// Bearer credential for the protected API
    pub access_token: String,
    /// Rotated refresh token, if the provider issued one
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds as reported by the provider; `exp` is authoritative
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Build a response from the three token values
    #[must_use]
    pub fn new(
        id_token: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            id_token: id_token.into(),
            access_token: access_token.into(),
            refresh_token,
            token_type: None,
            expires_in: None,
        }
    }
}

// Token values never reach logs.
impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("id_token", &"[redacted]")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Identity-provider URLs derived from [`AuthConfig`]
///
/// Parsed once so that the coordinator never has to handle a malformed URL
/// at redirect time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    /// OAuth client ID
    pub client_id: String,

    /// `{authUri}/oauth2/token`
    pub token_url: Url,

    /// `{authUri}/login?client_id=…&response_type=code&redirect_uri=…`
    pub login_url: Url,

    /// Application base URL, sent verbatim as `redirect_uri`
    pub redirect_uri: String,
}

impl OAuthEndpoints {
    /// Derive the endpoints from configuration
    ///
    /// # Errors
    /// Returns the parse error if `uri` or `web_uri` is not an absolute URL.
    pub fn from_config(config: &AuthConfig) -> Result<Self, url::ParseError> {
        let base = config.uri.trim_end_matches('/');
        // Validate the redirect target up front; it is sent as a plain string.
        Url::parse(&config.web_uri)?;

        let token_url = Url::parse(&format!("{base}/oauth2/token"))?;

        let mut login_url = Url::parse(&format!("{base}/login"))?;
        login_url
            .query_pairs_mut()
            .append_pair("client_id", &config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &config.web_uri);

        Ok(Self {
            client_id: config.client_id.clone(),
            token_url,
            login_url,
            redirect_uri: config.web_uri.clone(),
        })
    }
}

/// Snapshot of the stored session, computed without any exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionStatus {
    /// No access token stored
    NoSession,
    /// Access token present and its `exp` is still in the future
    Active {
        /// `exp` claim, epoch seconds
        expires_at_unix: f64,
    },
    /// Access token present but expired or undecodable; next use refreshes
    Expired,
}

/// Result of the application-boot callback check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The URL carried no authorization code
    NoCallback,
    /// A code was exchanged, the triple stored and the code stripped from the URL
    LoggedIn,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new("https://auth.example.com/", "client123", "https://app.example.com/")
    }

    #[test]
    fn slot_keys_match_storage_layout() {
        assert_eq!(TokenSlot::IdToken.key(), "id_token");
        assert_eq!(TokenSlot::AccessToken.key(), "access_token");
        assert_eq!(TokenSlot::RefreshToken.key(), "refresh_token");
        assert_eq!(TokenSlot::from_key("refresh_token"), Some(TokenSlot::RefreshToken));
        assert_eq!(TokenSlot::from_key("session"), None);
    }

    #[test]
    fn grant_type_wire_values() {
        assert_eq!(GrantType::AuthorizationCode.to_string(), "authorization_code");
        assert_eq!(GrantType::RefreshToken.to_string(), "refresh_token");
    }

    #[test]
    fn endpoints_from_config() {
        let endpoints = OAuthEndpoints::from_config(&config()).unwrap();

        assert_eq!(endpoints.token_url.as_str(), "https://auth.example.com/oauth2/token");
        assert_eq!(
            endpoints.login_url.as_str(),
            "https://auth.example.com/login?client_id=client123&response_type=code\
             &redirect_uri=https%3A%2F%2Fapp.example.com%2F"
        );
        assert_eq!(endpoints.redirect_uri, "https://app.example.com/");
        assert_eq!(endpoints.client_id, "client123");
    }

    #[test]
    fn endpoints_reject_relative_uri() {
        let bad = AuthConfig::new("auth.example.com", "client123", "https://app.example.com/");
        assert!(OAuthEndpoints::from_config(&bad).is_err());
    }

    #[test]
    fn token_response_refresh_token_is_optional() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"id_token":"I","access_token":"A","expires_in":3600}"#)
                .unwrap();

        assert_eq!(response.id_token, "I");
        assert_eq!(response.access_token, "A");
        assert!(response.refresh_token.is_none());
        assert_eq!(response.expires_in, Some(3600));
    }

    #[test]
    fn token_response_requires_access_token() {
        let result = serde_json::from_str::<TokenResponse>(r#"{"id_token":"I"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn token_response_debug_redacts_values() {
        let response = TokenResponse::new("secret-id", "secret-access", Some("secret-refresh".into()));
        let debug = format!("{response:?}");

        assert!(!debug.contains("secret"));
        assert!(debug.contains("[redacted]"));
    }
}
