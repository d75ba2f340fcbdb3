//! File-backed credential store
//!
//! Keeps the token triple for one application origin in a single JSON file.
//! Each write rewrites the whole file through a temp file and a rename, so a
//! crash never leaves a half-written document behind. Slots are still written
//! one at a time by the coordinator; there is no multi-slot atomicity.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use pca_common::auth::{CredentialStore, StoreError, TokenSlot};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// On-disk document
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl SessionFile {
    const fn slot(&self, slot: TokenSlot) -> &Option<String> {
        match slot {
            TokenSlot::IdToken => &self.id_token,
            TokenSlot::AccessToken => &self.access_token,
            TokenSlot::RefreshToken => &self.refresh_token,
        }
    }

    fn slot_mut(&mut self, slot: TokenSlot) -> &mut Option<String> {
        match slot {
            TokenSlot::IdToken => &mut self.id_token,
            TokenSlot::AccessToken => &mut self.access_token,
            TokenSlot::RefreshToken => &mut self.refresh_token,
        }
    }
}

/// Credential store persisted as JSON at a fixed path
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Store at exactly `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    /// Store under `dir`, in a file named after `origin`
    ///
    /// `https://app.example.com:8443` maps to
    /// `session-https___app.example.com_8443.json`.
    #[must_use]
    pub fn for_origin(dir: &Path, origin: &str) -> Self {
        let sanitized: String = origin
            .trim_end_matches('/')
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        Self::new(dir.join(format!("session-{sanitized}.json")))
    }

    /// Location of the session document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<SessionFile, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(SessionFile::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SessionFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Sibling path the next write goes through
    fn tmp_path(&self) -> Result<PathBuf, StoreError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            StoreError::AccessFailed(format!("{} does not name a file", self.path.display()))
        })?;
        let tmp_name = format!("{}.{}.tmp", file_name.to_string_lossy(), std::process::id());
        Ok(self.path.with_file_name(tmp_name))
    }

    fn write(&self, tmp_path: &Path, session: &SessionFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(session)?;
        if let Err(e) = write_and_rename(tmp_path, &self.path, &json) {
            if let Err(cleanup) = fs::remove_file(tmp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %tmp_path.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn update(&self, slot: TokenSlot, value: Option<&str>) -> Result<(), StoreError> {
        let tmp_path = self.tmp_path()?;
        let _guard = self.write_lock.lock();
        let mut session = self.read()?;

        let current = session.slot_mut(slot);
        if current.as_deref() == value {
            return Ok(());
        }
        *current = value.map(str::to_string);

        debug!(
            path = %self.path.display(),
            slot = %slot,
            present = value.is_some(),
            "Updating session file"
        );
        self.write(&tmp_path, &session)
    }
}

fn write_and_rename(tmp_path: &Path, path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = open_private(tmp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, path)
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, slot: TokenSlot) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.slot(slot).clone())
    }

    fn set(&self, slot: TokenSlot, value: &str) -> Result<(), StoreError> {
        self.update(slot, Some(value))
    }

    fn remove(&self, slot: TokenSlot) -> Result<(), StoreError> {
        self.update(slot, None)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));

        for slot in TokenSlot::ALL {
            assert_eq!(store.get(slot).unwrap(), None);
        }
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/session.json");

        let store = FileCredentialStore::new(&path);
        store.set(TokenSlot::IdToken, "I1").unwrap();
        store.set(TokenSlot::AccessToken, "A1").unwrap();
        store.set(TokenSlot::RefreshToken, "R1").unwrap();
        drop(store);

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.get(TokenSlot::IdToken).unwrap().as_deref(), Some("I1"));
        assert_eq!(reopened.get(TokenSlot::AccessToken).unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get(TokenSlot::RefreshToken).unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn test_remove_only_touches_one_slot() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.set(TokenSlot::AccessToken, "A1").unwrap();
        store.set(TokenSlot::RefreshToken, "R1").unwrap();

        store.remove(TokenSlot::AccessToken).unwrap();
        store.remove(TokenSlot::AccessToken).unwrap();

        assert_eq!(store.get(TokenSlot::AccessToken).unwrap(), None);
        assert_eq!(store.get(TokenSlot::RefreshToken).unwrap().as_deref(), Some("R1"));

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert!(!on_disk.contains("access_token"));
        assert!(on_disk.contains("\"refresh_token\": \"R1\""));
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.set(TokenSlot::IdToken, "I1").unwrap();
        store.set(TokenSlot::IdToken, "I2").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A non-empty directory at the target path makes the rename fail.
        let path = dir.path().join("session.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let store = FileCredentialStore::new(&path);
        let session = SessionFile { id_token: Some("I1".into()), ..SessionFile::default() };
        let err = store.write(&store.tmp_path().unwrap(), &session).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);
    }

    #[test]
    fn test_path_without_file_name_is_access_failure() {
        let store = FileCredentialStore::new("/");
        let err = store.set(TokenSlot::IdToken, "I1").unwrap_err();
        assert!(matches!(err, StoreError::AccessFailed(msg) if msg.contains("does not name a file")));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(matches!(store.get(TokenSlot::AccessToken), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_for_origin_sanitizes_file_name() {
        let store =
            FileCredentialStore::for_origin(Path::new("/var/lib/pca"), "https://app.example.com:8443/");
        assert_eq!(
            store.path(),
            Path::new("/var/lib/pca/session-https___app.example.com_8443.json")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("session.json"));
        store.set(TokenSlot::RefreshToken, "R1").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
