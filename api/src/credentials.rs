//! Client-side persistence of the bearer token.
//!
//! At most one token is current. [`CredentialStore::set`] replaces it and
//! [`CredentialStore::clear`] removes it; nothing ever merges two tokens.

use crate::error::CredentialError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Key the bearer token is stored under.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key-value store holding the current bearer token.
pub trait CredentialStore: Send + Sync {
    /// The current token, if any.
    fn get(&self) -> Option<String>;

    /// Replace the current token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the token could not be persisted.
    fn set(&self, token: &str) -> Result<(), CredentialError>;

    /// Remove the current token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the removal could not be persisted.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// In-process store; the token is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Store backed by a JSON object on disk, e.g. `{"accessToken": "..."}`.
///
/// Other keys in the file are preserved. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileCredentialStore {
    /// Open `path`, loading existing entries. A missing file is an empty
    /// store; it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Io`] if the file exists but cannot be read
    /// and [`CredentialError::Format`] if it is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| CredentialError::Format(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(CredentialError::Io(format!("{}: {e}", path.display()))),
        };

        tracing::debug!(path = %path.display(), has_token = entries.contains_key(ACCESS_TOKEN_KEY), "Opened credential file");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| CredentialError::Io(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| CredentialError::Format(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| CredentialError::Io(format!("{}: {e}", self.path.display())))
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(ACCESS_TOKEN_KEY)
            .cloned()
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        self.persist(&entries)
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(ACCESS_TOKEN_KEY).is_none() {
            return Ok(());
        }
        self.persist(&entries)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_replaces_and_clears() {
        let store = MemoryCredentialStore::with_token("old");
        store.set("new").unwrap();
        assert_eq!(store.get().as_deref(), Some("new"));

        store.clear().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::open(&path).unwrap();
        assert_eq!(store.get(), None);
        store.set("token-1").unwrap();

        let reopened = FileCredentialStore::open(&path).unwrap();
        assert_eq!(reopened.get().as_deref(), Some("token-1"));

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["accessToken"], "token-1");
    }

    #[test]
    fn file_store_keeps_unrelated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"theme": "dark", "accessToken": "t"}"#).unwrap();

        let store = FileCredentialStore::open(&path).unwrap();
        store.clear().unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert!(raw.get("accessToken").is_none());
    }

    #[test]
    fn file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            FileCredentialStore::open(&path),
            Err(CredentialError::Format(_))
        ));
    }
}
