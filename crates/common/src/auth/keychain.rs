//! Platform keychain credential store
//!
//! Persists each token slot as a separate keychain entry (macOS Keychain,
//! Windows Credential Manager, Linux Secret Service). The service name is
//! scoped by application origin so that two deployments never read each
//! other's tokens.
//!
//! ```no_run
//! use pca_common::auth::{CredentialStore, KeychainCredentialStore, TokenSlot};
//!
//! let store = KeychainCredentialStore::for_origin("PCA.session", "https://app.example.com");
//! store.set(TokenSlot::AccessToken, "eyJ...")?;
//! # Ok::<(), pca_common::auth::StoreError>(())
//! ```

use keyring::Entry;
use tracing::{debug, warn};

use super::store::StoreError;
use super::traits::CredentialStore;
use super::types::TokenSlot;

/// Credential store backed by the platform keychain
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service_name: String,
}

impl KeychainCredentialStore {
    /// Use `service_name` verbatim
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    /// Scope `service` to an application origin
    #[must_use]
    pub fn for_origin(service: &str, origin: &str) -> Self {
        Self::new(format!("{service}@{}", origin.trim_end_matches('/')))
    }

    /// Keychain service name entries are filed under
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, slot: TokenSlot) -> Result<Entry, StoreError> {
        Entry::new(&self.service_name, slot.key())
            .map_err(|e| keyring_failure("open", slot, e))
    }
}

/// Log a keyring failure and wrap it
fn keyring_failure(op: &str, slot: TokenSlot, err: keyring::Error) -> StoreError {
    warn!(op, slot = %slot, error = %err, "Keychain operation failed");
    StoreError::Keyring(err)
}

/// `NoEntry` on read means the slot is empty
fn read_outcome(
    slot: TokenSlot,
    result: Result<String, keyring::Error>,
) -> Result<Option<String>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(keyring_failure("read", slot, e)),
    }
}

/// `NoEntry` on delete means the slot was already empty
fn delete_outcome(slot: TokenSlot, result: Result<(), keyring::Error>) -> Result<(), StoreError> {
    match result {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(keyring_failure("delete", slot, e)),
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>, StoreError> {
        debug!(service = %self.service_name, slot = %slot, "Reading token from keychain");
        read_outcome(slot, self.entry(slot)?.get_password())
    }

    fn set(&self, slot: TokenSlot, value: &str) -> Result<(), StoreError> {
        debug!(service = %self.service_name, slot = %slot, "Storing token in keychain");

        self.entry(slot)?.set_password(value).map_err(|e| keyring_failure("store", slot, e))
    }

    fn remove(&self, slot: TokenSlot) -> Result<(), StoreError> {
        debug!(service = %self.service_name, slot = %slot, "Deleting token from keychain");
        delete_outcome(slot, self.entry(slot)?.delete_credential())
    }
}
