//! Session bootstrap
//!
//! Turns a validated [`Config`] into a ready [`SessionCoordinator`] backed by
//! the HTTP token client. The host still supplies the store and location,
//! since only it knows where tokens live and what the page URL is.
//!
//! ```no_run
//! use pca_common::auth::InMemoryLocation;
//! use pca_infra::SessionBootstrap;
//!
//! # async fn boot() -> Result<(), Box<dyn std::error::Error>> {
//! let bootstrap = SessionBootstrap::from_environment()?;
//! bootstrap.init_tracing()?;
//!
//! let store = bootstrap.file_store("/var/lib/pca".as_ref())?;
//! let location = InMemoryLocation::parse("https://app.example.com/?code=abc")?;
//! let coordinator = bootstrap.coordinator(store, location)?;
//! coordinator.handle_callback().await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use pca_common::auth::{CredentialStore, Location, OAuthClient, OAuthEndpoints, SessionCoordinator};
use pca_domain::{Config, PcaError, Result};
use url::Url;

use crate::config;
use crate::observability;
use crate::store::FileCredentialStore;

/// Coordinator wired to the HTTP token client
pub type HttpSessionCoordinator<S, L> = SessionCoordinator<S, OAuthClient, L>;

/// Validated configuration plus the constructors that depend on it
#[derive(Debug, Clone)]
pub struct SessionBootstrap {
    config: Config,
}

impl SessionBootstrap {
    /// Wrap an already-loaded configuration
    ///
    /// # Errors
    /// Returns `PcaError::Config` if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Load `.env`, then configuration from the environment or a file
    ///
    /// # Errors
    /// Returns `PcaError::Config` if no valid configuration is found.
    pub fn from_environment() -> Result<Self> {
        config::load_dotenv();
        Self::new(config::load()?)
    }

    /// Validated configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Install the tracing subscriber described by the logging section
    ///
    /// # Errors
    /// See [`observability::init_tracing`].
    pub fn init_tracing(&self) -> Result<()> {
        observability::init_tracing(&self.config.logging)
    }

    /// Identity-provider URLs for this configuration
    ///
    /// # Errors
    /// Returns `PcaError::Config` if a URI does not parse.
    pub fn endpoints(&self) -> Result<OAuthEndpoints> {
        OAuthEndpoints::from_config(&self.config.auth)
            .map_err(|e| PcaError::Config(format!("Invalid auth URI: {e}")))
    }

    /// Application origin (`scheme://host[:port]`), used to scope stores
    ///
    /// # Errors
    /// Returns `PcaError::Config` if `web_uri` does not parse.
    pub fn origin(&self) -> Result<String> {
        let url = Url::parse(&self.config.auth.web_uri)
            .map_err(|e| PcaError::Config(format!("Invalid web URI: {e}")))?;
        Ok(url.origin().ascii_serialization())
    }

    /// File store under `dir`, scoped to this application's origin
    ///
    /// # Errors
    /// Returns `PcaError::Config` if `web_uri` does not parse.
    pub fn file_store(&self, dir: &Path) -> Result<FileCredentialStore> {
        Ok(FileCredentialStore::for_origin(dir, &self.origin()?))
    }

    /// Platform keychain store scoped to this application's origin
    ///
    /// # Errors
    /// Returns `PcaError::Config` if `web_uri` does not parse.
    #[cfg(feature = "keychain")]
    pub fn keychain_store(
        &self,
        service: &str,
    ) -> Result<pca_common::auth::KeychainCredentialStore> {
        Ok(pca_common::auth::KeychainCredentialStore::for_origin(service, &self.origin()?))
    }

    /// Build a coordinator around `store` and `location`
    ///
    /// # Errors
    /// Returns `PcaError::Config` if a URI does not parse, or
    /// `PcaError::Internal` if the HTTP client cannot be built.
    pub fn coordinator<S, L>(&self, store: S, location: L) -> Result<HttpSessionCoordinator<S, L>>
    where
        S: CredentialStore,
        L: Location,
    {
        let endpoints = self.endpoints()?;
        tracing::debug!(
            token_url = %endpoints.token_url,
            client_id = %endpoints.client_id,
            "Building session coordinator"
        );
        let client = OAuthClient::try_new(endpoints.clone())
            .map_err(|e| PcaError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(SessionCoordinator::new(endpoints, store, client, location))
    }
}
