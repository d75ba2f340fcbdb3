//! Seams between the session coordinator and its environment
//!
//! The coordinator never touches storage, the network, or the page URL
//! directly. Each concern sits behind one of these traits so it can be swapped
//! for a platform implementation or a test double.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use super::client::ExchangeError;
use super::store::StoreError;
use super::types::{GrantType, TokenResponse, TokenSlot};

/// Persistent key/value storage for the token triple
///
/// Scoped to the application origin and survives page reloads. Writes to
/// different slots are independent; there is no multi-key atomicity.
pub trait CredentialStore: Send + Sync {
    /// Read a slot; `Ok(None)` if it was never written or has been removed
    ///
    /// # Errors
    /// Returns `StoreError` if the backing storage is unavailable.
    fn get(&self, slot: TokenSlot) -> Result<Option<String>, StoreError>;

    /// Write a slot, replacing any previous value
    ///
    /// # Errors
    /// Returns `StoreError` if the backing storage rejects the write.
    fn set(&self, slot: TokenSlot, value: &str) -> Result<(), StoreError>;

    /// Remove a slot (idempotent)
    ///
    /// # Errors
    /// Returns `StoreError` if the backing storage is unavailable.
    fn remove(&self, slot: TokenSlot) -> Result<(), StoreError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>, StoreError> {
        (**self).get(slot)
    }

    fn set(&self, slot: TokenSlot, value: &str) -> Result<(), StoreError> {
        (**self).set(slot, value)
    }

    fn remove(&self, slot: TokenSlot) -> Result<(), StoreError> {
        (**self).remove(slot)
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for Box<T> {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>, StoreError> {
        (**self).get(slot)
    }

    fn set(&self, slot: TokenSlot, value: &str) -> Result<(), StoreError> {
        (**self).set(slot, value)
    }

    fn remove(&self, slot: TokenSlot) -> Result<(), StoreError> {
        (**self).remove(slot)
    }
}

/// Performs grants against the identity provider's token endpoint
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Run a single grant
    ///
    /// `params` are sent alongside `grant_type` and `client_id`, in order.
    ///
    /// # Errors
    /// Returns `ExchangeError` on transport failure, non-2xx status, or an
    /// unparseable body.
    async fn exchange(
        &self,
        grant: GrantType,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, ExchangeError>;

    /// Trade an authorization code for a full token triple
    ///
    /// # Errors
    /// See [`TokenExchanger::exchange`].
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, ExchangeError> {
        self.exchange(GrantType::AuthorizationCode, &[("code", code), ("redirect_uri", redirect_uri)])
            .await
    }

    /// Trade a refresh token for fresh id and access tokens
    ///
    /// # Errors
    /// Returns `ExchangeError::NoRefreshToken` for an empty token, otherwise
    /// see [`TokenExchanger::exchange`].
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ExchangeError> {
        if refresh_token.is_empty() {
            return Err(ExchangeError::NoRefreshToken);
        }
        self.exchange(GrantType::RefreshToken, &[("refresh_token", refresh_token)]).await
    }
}

#[async_trait]
impl<T: TokenExchanger + ?Sized> TokenExchanger for Arc<T> {
    async fn exchange(
        &self,
        grant: GrantType,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, ExchangeError> {
        (**self).exchange(grant, params).await
    }
}

/// The page URL the application is running under
///
/// `replace_url` rewrites history without navigating; `assign` is a full
/// navigation that ends the current page context.
pub trait Location: Send + Sync {
    /// Current page URL, including query string
    fn current_url(&self) -> Url;

    /// Replace the current history entry without reloading
    fn replace_url(&self, url: Url);

    /// Navigate away to `url`
    fn assign(&self, url: Url);
}

impl<T: Location + ?Sized> Location for Arc<T> {
    fn current_url(&self) -> Url {
        (**self).current_url()
    }

    fn replace_url(&self, url: Url) {
        (**self).replace_url(url);
    }

    fn assign(&self, url: Url) {
        (**self).assign(url);
    }
}
