//! Credential store implementations that need the filesystem

pub mod file;

pub use file::FileCredentialStore;
