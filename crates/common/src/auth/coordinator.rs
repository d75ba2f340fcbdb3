//! Session coordinator
//!
//! Owns the token lifecycle: consuming the authorization-code callback,
//! handing out a live access token, refreshing it when it expires, and
//! sending the user back to the identity provider when nothing else works.
//!
//! # Failure policy
//!
//! | Operation          | Exchange fails                          |
//! |--------------------|-----------------------------------------|
//! | `complete_login`   | redirect to login, `LoginRequired`      |
//! | `get_token`        | redirect to login, `LoginRequired`      |
//! | `force_refresh`    | no redirect, `Exchange` to the caller   |
//!
//! A `LoginRequired` error means the page is navigating away; callers should
//! stop rather than retry.

use pca_domain::PcaError;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::client::ExchangeError;
use super::jwt::{self, AccessClaims, IdentityClaims};
use super::location::{query_param, without_query_param};
use super::store::StoreError;
use super::traits::{CredentialStore, Location, TokenExchanger};
use super::types::{CallbackOutcome, OAuthEndpoints, SessionStatus, TokenResponse, TokenSlot};
use crate::time::{Clock, SystemClock};

/// Message used when the provider reports an error without a description
pub const DEFAULT_PROVIDER_ERROR: &str = "Invalid configuration";

/// Redirect reason when the authorization code cannot be exchanged
pub const REASON_INVALID_CODE: &str = "Couldn't validate code";

/// Redirect reason when an expired session cannot be refreshed
pub const REASON_REFRESH_FAILED: &str = "Error refreshing tokens";

/// Session coordinator error types
#[derive(Debug, Error)]
pub enum SessionError {
    /// The identity provider redirected back with `error` set
    #[error("{}", .description.as_deref().unwrap_or(DEFAULT_PROVIDER_ERROR))]
    Provider {
        /// OAuth error code, e.g. `access_denied`
        error: String,
        /// `error_description`, if the provider sent a non-empty one
        description: Option<String>,
    },

    /// Token exchange failed and the caller decides what happens next
    #[error("Token exchange failed: {0}")]
    Exchange(#[from] ExchangeError),

    /// Token exchange failed and the login redirect has been issued
    #[error("Login required: {reason}")]
    LoginRequired {
        /// Why the session could not continue
        reason: &'static str,
        /// Exchange failure that triggered the redirect
        #[source]
        source: ExchangeError,
    },

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Whether the page context is being replaced by the login screen
    #[must_use]
    pub const fn is_login_redirect(&self) -> bool {
        matches!(self, Self::LoginRequired { .. })
    }
}

impl From<SessionError> for PcaError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Provider { description, .. } => Self::Auth(
                description.unwrap_or_else(|| DEFAULT_PROVIDER_ERROR.to_string()),
            ),
            SessionError::Exchange(ExchangeError::Network(msg)) => Self::Network(msg),
            SessionError::Exchange(inner) => Self::Auth(inner.to_string()),
            SessionError::LoginRequired { reason, .. } => Self::LoginRequired(reason.to_string()),
            SessionError::Store(inner) => Self::Storage(inner.to_string()),
        }
    }
}

/// Coordinates the credential store, token exchanger and page location
///
/// Generic over its collaborators so hosts can plug in a keychain or file
/// store, and tests can script every exchange.
///
/// # Examples
/// ```
/// use pca_common::auth::{
///     InMemoryLocation, MemoryCredentialStore, OAuthClient, OAuthEndpoints, SessionCoordinator,
/// };
/// use pca_domain::AuthConfig;
///
/// let config = AuthConfig::new(
///     "https://auth.example.com",
///     "client123",
///     "https://app.example.com/",
/// );
/// let endpoints = OAuthEndpoints::from_config(&config).unwrap();
/// let coordinator = SessionCoordinator::new(
///     endpoints.clone(),
///     MemoryCredentialStore::new(),
///     OAuthClient::new(endpoints),
///     InMemoryLocation::parse("https://app.example.com/").unwrap(),
/// );
/// assert!(coordinator.login_url().as_str().starts_with("https://auth.example.com/login?"));
/// ```
pub struct SessionCoordinator<S, E, L, C = SystemClock> {
    endpoints: OAuthEndpoints,
    store: S,
    exchanger: E,
    location: L,
    clock: C,
}

impl<S, E, L> SessionCoordinator<S, E, L, SystemClock>
where
    S: CredentialStore,
    E: TokenExchanger,
    L: Location,
{
    /// Create a coordinator that reads wall-clock time
    pub const fn new(endpoints: OAuthEndpoints, store: S, exchanger: E, location: L) -> Self {
        Self { endpoints, store, exchanger, location, clock: SystemClock }
    }
}

impl<S, E, L, C> SessionCoordinator<S, E, L, C>
where
    S: CredentialStore,
    E: TokenExchanger,
    L: Location,
    C: Clock,
{
    /// Swap the clock used for expiry checks
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SessionCoordinator<S, E, L, C2> {
        SessionCoordinator {
            endpoints: self.endpoints,
            store: self.store,
            exchanger: self.exchanger,
            location: self.location,
            clock,
        }
    }

    /// Identity-provider URLs this coordinator was built with
    #[must_use]
    pub const fn endpoints(&self) -> &OAuthEndpoints {
        &self.endpoints
    }

    /// Underlying credential store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Page location the coordinator reads and navigates
    #[must_use]
    pub const fn location(&self) -> &L {
        &self.location
    }

    /// Identity-provider login page, with client ID and redirect URI filled in
    #[must_use]
    pub const fn login_url(&self) -> &Url {
        &self.endpoints.login_url
    }

    /// Inspect the current URL for a provider callback
    ///
    /// Returns the authorization code if present. An empty `error` parameter
    /// is ignored. Has no side effects.
    ///
    /// # Errors
    /// Returns `SessionError::Provider` if the provider redirected back with
    /// `error`; its message is `error_description`, or
    /// [`DEFAULT_PROVIDER_ERROR`] when that is missing or empty.
    pub fn parse_callback(&self) -> Result<Option<String>, SessionError> {
        let url = self.location.current_url();

        if let Some(error) = query_param(&url, "error").filter(|e| !e.is_empty()) {
            let description = query_param(&url, "error_description").filter(|d| !d.is_empty());
            warn!(error = %error, description = ?description, "Identity provider returned an error");
            return Err(SessionError::Provider { error, description });
        }

        Ok(query_param(&url, "code"))
    }

    /// Exchange an authorization code and persist the resulting triple
    ///
    /// On success the `code` parameter is stripped from the page URL (other
    /// parameters are kept). On exchange failure nothing is written and the
    /// login redirect is issued.
    ///
    /// # Errors
    /// `LoginRequired` if the exchange failed; `Store` if a write failed.
    pub async fn complete_login(&self, code: &str) -> Result<(), SessionError> {
        debug!("Exchanging authorization code");

        let tokens = match self.exchanger.exchange_code(code, &self.endpoints.redirect_uri).await {
            Ok(tokens) => tokens,
            Err(err) => return Err(self.login_required(REASON_INVALID_CODE, err)),
        };

        self.store_triple(&tokens)?;
        info!("Login completed, session tokens stored");

        let current = self.location.current_url();
        self.location.replace_url(without_query_param(&current, "code"));
        Ok(())
    }

    /// Run [`parse_callback`](Self::parse_callback) and, if a code is
    /// present, [`complete_login`](Self::complete_login)
    ///
    /// # Errors
    /// Propagates errors from either step.
    pub async fn handle_callback(&self) -> Result<CallbackOutcome, SessionError> {
        match self.parse_callback()? {
            None => Ok(CallbackOutcome::NoCallback),
            Some(code) => {
                self.complete_login(&code).await?;
                Ok(CallbackOutcome::LoggedIn)
            }
        }
    }

    /// Return a live access token, refreshing it if it has expired
    ///
    /// `Ok(None)` means there is no session; the caller decides whether to
    /// redirect. An access token that cannot be decoded is treated as
    /// expired. A refresh rewrites the id and access slots only.
    ///
    /// # Errors
    /// `LoginRequired` if the refresh failed (the redirect has been issued);
    /// `Store` if the store could not be read or written.
    pub async fn get_token(&self) -> Result<Option<String>, SessionError> {
        let Some(access_token) = self.store.get(TokenSlot::AccessToken)? else {
            debug!("No access token stored");
            return Ok(None);
        };

        let now = self.clock.unix_seconds();
        match jwt::decode_payload::<AccessClaims>(&access_token) {
            Ok(claims) if claims.is_live_at(now) => return Ok(Some(access_token)),
            Ok(claims) => debug!(exp = claims.exp, now, "Access token expired"),
            Err(err) => debug!(error = %err, "Access token unreadable, treating as expired"),
        }

        let refreshed = match self.store.get(TokenSlot::RefreshToken)? {
            Some(refresh_token) => self.exchanger.refresh(&refresh_token).await,
            None => Err(ExchangeError::NoRefreshToken),
        };

        match refreshed {
            Ok(tokens) => {
                self.store.set(TokenSlot::IdToken, &tokens.id_token)?;
                self.store.set(TokenSlot::AccessToken, &tokens.access_token)?;
                info!("Access token refreshed");
                Ok(Some(tokens.access_token))
            }
            Err(err) => Err(self.login_required(REASON_REFRESH_FAILED, err)),
        }
    }

    /// Refresh unconditionally and return the new id token
    ///
    /// The id and access slots are cleared before the exchange starts, so a
    /// failure leaves no stale access token behind. A rotated refresh token
    /// replaces the stored one; otherwise the stored one is kept. Never
    /// redirects.
    ///
    /// # Errors
    /// `Exchange` if no refresh token is stored or the exchange failed;
    /// `Store` on storage failure.
    pub async fn force_refresh(&self) -> Result<String, SessionError> {
        self.store.remove(TokenSlot::IdToken)?;
        self.store.remove(TokenSlot::AccessToken)?;

        let refresh_token =
            self.store.get(TokenSlot::RefreshToken)?.ok_or(ExchangeError::NoRefreshToken)?;

        debug!("Forcing token refresh");
        let tokens = self.exchanger.refresh(&refresh_token).await?;

        self.store_triple(&tokens)?;
        info!(rotated = tokens.refresh_token.is_some(), "Tokens force-refreshed");
        Ok(tokens.id_token)
    }

    /// Navigate to the identity provider's login page
    ///
    /// Store contents are left alone; the next successful login overwrites
    /// them.
    pub fn redirect_to_login(&self, reason: &str, cause: Option<&ExchangeError>) {
        match cause {
            Some(err) => warn!(reason, error = %err, "Redirecting to login"),
            None => info!(reason, "Redirecting to login"),
        }
        self.location.assign(self.endpoints.login_url.clone());
    }

    /// Describe the stored session without contacting the provider
    ///
    /// # Errors
    /// `Store` if the access slot cannot be read.
    pub fn status(&self) -> Result<SessionStatus, SessionError> {
        let Some(access_token) = self.store.get(TokenSlot::AccessToken)? else {
            return Ok(SessionStatus::NoSession);
        };

        let now = self.clock.unix_seconds();
        Ok(match jwt::decode_payload::<AccessClaims>(&access_token) {
            Ok(claims) if claims.is_live_at(now) => {
                SessionStatus::Active { expires_at_unix: claims.exp }
            }
            _ => SessionStatus::Expired,
        })
    }

    /// Display claims from the stored id token
    ///
    /// `Ok(None)` when no id token is stored or it cannot be decoded.
    ///
    /// # Errors
    /// `Store` if the id slot cannot be read.
    pub fn identity(&self) -> Result<Option<IdentityClaims>, SessionError> {
        let Some(id_token) = self.store.get(TokenSlot::IdToken)? else {
            return Ok(None);
        };

        match jwt::decode_payload::<IdentityClaims>(&id_token) {
            Ok(claims) => Ok(Some(claims)),
            Err(err) => {
                debug!(error = %err, "Stored id token unreadable");
                Ok(None)
            }
        }
    }

    /// Remove all three tokens. Does not navigate.
    ///
    /// # Errors
    /// `Store` if a slot cannot be removed.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        for slot in TokenSlot::ALL {
            self.store.remove(slot)?;
        }
        info!("Session cleared");
        Ok(())
    }

    /// Write id, access, then refresh (only if the response carries one)
    fn store_triple(&self, tokens: &TokenResponse) -> Result<(), StoreError> {
        self.store.set(TokenSlot::IdToken, &tokens.id_token)?;
        self.store.set(TokenSlot::AccessToken, &tokens.access_token)?;
        if let Some(refresh_token) = &tokens.refresh_token {
            self.store.set(TokenSlot::RefreshToken, refresh_token)?;
        }
        Ok(())
    }

    fn login_required(&self, reason: &'static str, err: ExchangeError) -> SessionError {
        self.redirect_to_login(reason, Some(&err));
        SessionError::LoginRequired { reason, source: err }
    }
}
