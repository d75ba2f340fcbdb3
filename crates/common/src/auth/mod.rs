//! Client-side OAuth 2.0 session core
//!
//! Implements the authorization-code flow for a public client: the user is
//! sent to the identity provider's hosted login page, comes back with a
//! `code`, and the code is exchanged for an id/access/refresh token triple.
//! After that the coordinator hands out access tokens and refreshes them
//! transparently when they expire.
//!
//! # Features
//!
//! - **Callback handling**: Reads `code` / `error` from the page URL and
//!   strips the code once consumed
//! - **Lazy refresh**: Access tokens are checked against their `exp` claim on
//!   every read; expired ones are refreshed before being returned
//! - **Forced refresh**: Clears and rotates the session on demand
//! - **Pluggable storage**: In-memory, platform keychain (`platform`
//!   feature), or the file store in `pca-infra`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  SessionCoordinator  │  Token lifecycle + redirect policy
//! └──────────┬───────────┘
//!            │
//!            ├──► CredentialStore   (id / access / refresh slots)
//!            ├──► TokenExchanger    (POST {authUri}/oauth2/token)
//!            │         │
//!            │         └──► OAuthClient  (reqwest, form-encoded)
//!            ├──► Location          (page URL, login navigation)
//!            └──► Clock             (expiry checks)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use pca_common::auth::{
//!     InMemoryLocation, MemoryCredentialStore, OAuthClient, OAuthEndpoints, SessionCoordinator,
//! };
//! use pca_domain::AuthConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::new(
//!     "https://pca.auth.us-east-1.amazoncognito.com",
//!     "client123",
//!     "https://app.example.com/",
//! );
//! let endpoints = OAuthEndpoints::from_config(&config)?;
//! let coordinator = SessionCoordinator::new(
//!     endpoints.clone(),
//!     MemoryCredentialStore::new(),
//!     OAuthClient::new(endpoints),
//!     InMemoryLocation::parse("https://app.example.com/?code=abc")?,
//! );
//!
//! // On application boot
//! coordinator.handle_callback().await?;
//!
//! // Before every API call
//! match coordinator.get_token().await? {
//!     Some(token) => println!("Authorization: Bearer {token}"),
//!     None => coordinator.redirect_to_login("No session", None),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: Token slots, token response, endpoints
//! - **[`traits`]**: `CredentialStore`, `TokenExchanger`, `Location`
//! - **[`client`]**: HTTP token exchanger
//! - **[`coordinator`]**: Session lifecycle
//! - **[`jwt`]**: Unverified payload decoding for `exp` and identity claims
//! - **[`store`]**: Store errors and the in-memory store
//! - **[`location`]**: URL helpers and the in-memory location

pub mod client;
pub mod coordinator;
pub mod jwt;
#[cfg(feature = "platform")]
pub mod keychain;
pub mod location;
pub mod store;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use client::{ExchangeError, OAuthClient};
pub use coordinator::{SessionCoordinator, SessionError};
pub use jwt::{AccessClaims, IdentityClaims, TokenError};
#[cfg(feature = "platform")]
pub use keychain::KeychainCredentialStore;
pub use location::InMemoryLocation;
pub use store::{MemoryCredentialStore, StoreError};
pub use traits::{CredentialStore, Location, TokenExchanger};
pub use types::{
    CallbackOutcome, GrantType, OAuthEndpoints, SessionStatus, TokenResponse, TokenSlot,
};
