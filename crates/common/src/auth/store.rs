//! Credential store errors and the in-memory store

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::trace;

use super::traits::CredentialStore;
use super::types::TokenSlot;

/// Credential store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing storage refused access (permission denied, not available, etc.)
    #[error("Credential store access failed: {0}")]
    AccessFailed(String),

    /// Persisted state could not be read back
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error from a file-backed store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying keyring library error
    #[cfg(feature = "platform")]
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Process-local credential store
///
/// Used by tests and by hosts that do not need tokens to outlive the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slots: Mutex<HashMap<TokenSlot, String>>,
}

impl MemoryCredentialStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all populated slots
    #[must_use]
    pub fn snapshot(&self) -> HashMap<TokenSlot, String> {
        self.slots.lock().clone()
    }

    /// Whether no slot is populated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>, StoreError> {
        Ok(self.slots.lock().get(&slot).cloned())
    }

    fn set(&self, slot: TokenSlot, value: &str) -> Result<(), StoreError> {
        trace!(slot = %slot, "Writing credential slot");
        self.slots.lock().insert(slot, value.to_string());
        Ok(())
    }

    fn remove(&self, slot: TokenSlot) -> Result<(), StoreError> {
        trace!(slot = %slot, "Removing credential slot");
        self.slots.lock().remove(&slot);
        Ok(())
    }
}
