//! HTTP token exchanger
//!
//! Posts form-encoded grants to the identity provider's `/oauth2/token`
//! endpoint. Every request carries `grant_type` and `client_id`; grant
//! specific fields follow. No client secret is sent: this is a public client.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use super::traits::TokenExchanger;
use super::types::{GrantType, OAuthEndpoints, TokenResponse};

/// Error type for token exchanges
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Request never produced a response (DNS, TLS, connection reset, ...)
    #[error("Token request failed: {0}")]
    Network(String),

    /// Token endpoint answered with a non-2xx status; the body is not read
    #[error("Bad response from auth endpoint (HTTP {status})")]
    BadResponse { status: u16 },

    /// 2xx response whose body is not a token response
    #[error("Malformed token response: {0}")]
    Malformed(String),

    /// No refresh token is stored, so a refresh cannot be attempted
    #[error("No refresh token available")]
    NoRefreshToken,
}

/// Token endpoint client
#[derive(Debug, Clone)]
pub struct OAuthClient {
    endpoints: OAuthEndpoints,
    http: Client,
}

impl OAuthClient {
    /// Create a client for `endpoints`
    ///
    /// Set `PCA_DISABLE_PROXY` to bypass system proxies (useful against a
    /// local mock server). If the configured HTTP client cannot be built, a
    /// warning is logged and reqwest's default client is used; call
    /// [`try_new`](Self::try_new) to get the error instead.
    ///
    /// # Examples
    /// ```
    /// use pca_common::auth::{OAuthClient, OAuthEndpoints};
    /// use pca_domain::AuthConfig;
    ///
    /// let config = AuthConfig::new(
    ///     "https://auth.example.com",
    ///     "client123",
    ///     "https://app.example.com/",
    /// );
    /// let endpoints = OAuthEndpoints::from_config(&config).unwrap();
    /// let client = OAuthClient::new(endpoints);
    /// assert_eq!(client.endpoints().token_url.path(), "/oauth2/token");
    /// ```
    #[must_use]
    pub fn new(endpoints: OAuthEndpoints) -> Self {
        match Self::http_client() {
            Ok(http) => Self { endpoints, http },
            Err(e) => {
                warn!(error = %e, "Failed to build configured HTTP client, using defaults");
                Self { endpoints, http: Client::default() }
            }
        }
    }

    /// Like [`new`](Self::new), but reports an HTTP client build failure
    ///
    /// # Errors
    /// Returns the `reqwest` error if the TLS backend or proxy settings
    /// cannot be initialised.
    pub fn try_new(endpoints: OAuthEndpoints) -> Result<Self, reqwest::Error> {
        Ok(Self { endpoints, http: Self::http_client()? })
    }

    fn http_client() -> Result<Client, reqwest::Error> {
        let builder = Client::builder();
        let builder = if std::env::var_os("PCA_DISABLE_PROXY").is_some() {
            builder.no_proxy()
        } else {
            builder
        };
        builder.build()
    }

    /// Create a client around a caller-configured `reqwest::Client`
    #[must_use]
    pub const fn with_http_client(endpoints: OAuthEndpoints, http: Client) -> Self {
        Self { endpoints, http }
    }

    /// Endpoints this client talks to
    #[must_use]
    pub const fn endpoints(&self) -> &OAuthEndpoints {
        &self.endpoints
    }
}

#[async_trait]
impl TokenExchanger for OAuthClient {
    async fn exchange(
        &self,
        grant: GrantType,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, ExchangeError> {
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 2);
        form.push(("grant_type", grant.as_str()));
        form.push(("client_id", self.endpoints.client_id.as_str()));
        form.extend_from_slice(params);

        debug!(grant = %grant, url = %self.endpoints.token_url, "Requesting tokens");

        let response = self
            .http
            .post(self.endpoints.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| ExchangeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(grant = %grant, status = status.as_u16(), "Token endpoint rejected grant");
            return Err(ExchangeError::BadResponse { status: status.as_u16() });
        }

        let body = response.text().await.map_err(|e| ExchangeError::Network(e.to_string()))?;
        let tokens: TokenResponse =
            serde_json::from_str(&body).map_err(|e| ExchangeError::Malformed(e.to_string()))?;

        debug!(
            grant = %grant,
            rotated_refresh_token = tokens.refresh_token.is_some(),
            "Token exchange succeeded"
        );
        Ok(tokens)
    }
}
