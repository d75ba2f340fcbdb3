//! Client-side OAuth2 session core shared across PCA crates.
//!
//! Obtains, persists, validates, and transparently refreshes the
//! id/access/refresh token triple for an application talking to a protected
//! API. See [`auth`] for the component overview.
//!
//! # Feature Tiers
//!
//! - default: session coordinator, HTTP token client, in-memory store
//! - `platform`: platform keychain credential store
//! - `test-utils`: mock token exchanger and JWT fixtures

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{
    CallbackOutcome, CredentialStore, ExchangeError, Location, SessionCoordinator, SessionError,
    SessionStatus, TokenExchanger,
};
pub use time::{Clock, MockClock, SystemClock};
