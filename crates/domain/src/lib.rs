//! # PCA Domain
//!
//! Plain data types shared by the post-call analytics session crates.
//!
//! This crate contains:
//! - Configuration structures (identity provider, logging)
//! - Application error type and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other PCA crates
//! - No I/O: loading configuration lives in `pca-infra`

pub mod config;
pub mod errors;

// Re-export commonly used items
pub use config::{AuthConfig, Config, LoggingConfig};
pub use errors::{PcaError, Result};
