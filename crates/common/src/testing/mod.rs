//! Testing utilities and helpers
//!
//! - **[`fixtures`]**: Unsigned JWTs and token responses
//! - **[`mocks`]**: Scripted [`TokenExchanger`](crate::auth::TokenExchanger)
//!
//! ## Usage
//!
//! ```rust
//! use pca_common::testing::{jwt_with_exp, MockTokenExchanger};
//!
//! let exchanger = MockTokenExchanger::new();
//! exchanger.push_tokens("I1", &jwt_with_exp(2_000), Some("R1"));
//! assert_eq!(exchanger.call_count(), 0);
//! ```

pub mod fixtures;
pub mod mocks;

pub use fixtures::{jwt_with_claims, jwt_with_exp, token_response};
pub use mocks::{MockTokenExchanger, RecordedExchange};
