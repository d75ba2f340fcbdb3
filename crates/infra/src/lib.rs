//! # PCA Infrastructure
//!
//! Impure pieces around the session core in `pca-common`.
//!
//! This crate contains:
//! - Configuration loading (environment, `.env`, TOML/JSON files)
//! - Tracing subscriber setup
//! - File-backed credential store
//! - [`SessionBootstrap`], which wires a configured coordinator together
//!
//! ## Architecture
//! - Implements the `CredentialStore` seam defined in `pca-common`
//! - Depends on `pca-domain` for configuration and error types
//! - Contains all filesystem and environment access

pub mod bootstrap;
pub mod config;
pub mod observability;
pub mod store;

// Re-export commonly used items
pub use bootstrap::SessionBootstrap;
pub use observability::init_tracing;
pub use store::FileCredentialStore;
