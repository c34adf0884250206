//! Session: the credential store and navigator the client acts on.
//!
//! Passed explicitly into [`ApiClient`](crate::ApiClient); there is no
//! ambient global token.

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use crate::error::CredentialError;
use crate::navigator::{LOGIN_PATH, Navigator, TracingNavigator};
use std::sync::Arc;

/// Credential store plus navigator, shared by every clone of a client.
#[derive(Clone)]
pub struct Session {
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    /// Session over the given collaborators.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            credentials,
            navigator,
        }
    }

    /// In-memory token, logging navigator.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(TracingNavigator),
        )
    }

    /// Session for `config`: file-backed when `credentials_path` is set,
    /// in-memory otherwise. Navigation is logged.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the credential file cannot be opened.
    pub fn from_config(config: &ClientConfig) -> Result<Self, CredentialError> {
        match &config.credentials_path {
            Some(path) => Ok(Self::new(
                Arc::new(FileCredentialStore::open(path)?),
                Arc::new(TracingNavigator),
            )),
            None => Ok(Self::in_memory()),
        }
    }

    /// The current bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.credentials.get()
    }

    /// Replace the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the token could not be persisted.
    pub fn replace_token(&self, token: &str) -> Result<(), CredentialError> {
        self.credentials.set(token)
    }

    /// Forget the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the removal could not be persisted.
    pub fn clear_token(&self) -> Result<(), CredentialError> {
        self.credentials.clear()
    }

    /// End the session: forget the token and send the user to the login
    /// entry point. A storage failure is logged; navigation still happens.
    pub fn terminate(&self) {
        if let Err(error) = self.credentials.clear() {
            tracing::error!(%error, "Failed to clear credential while ending session");
        }
        self.navigator.navigate(LOGIN_PATH);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_token", &self.token().is_some())
            .finish_non_exhaustive()
    }
}
