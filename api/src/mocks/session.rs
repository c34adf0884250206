//! Session with inspectable collaborators.

use super::RecordingNavigator;
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::session::Session;
use std::sync::Arc;

/// A [`Session`] over an in-memory credential store and a recording
/// navigator, with handles to both.
#[derive(Debug, Clone)]
pub struct TestSession {
    /// The session to hand to a client.
    pub session: Session,
    /// The credential store behind `session`.
    pub credentials: Arc<MemoryCredentialStore>,
    /// The navigator behind `session`.
    pub navigator: Arc<RecordingNavigator>,
}

impl TestSession {
    /// Signed-out session.
    #[must_use]
    pub fn new() -> Self {
        Self::from_store(MemoryCredentialStore::new())
    }

    /// Session already holding `token`.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self::from_store(MemoryCredentialStore::with_token(token))
    }

    fn from_store(store: MemoryCredentialStore) -> Self {
        let credentials = Arc::new(store);
        let navigator = Arc::new(RecordingNavigator::new());
        let session = Session::new(credentials.clone(), navigator.clone());
        Self {
            session,
            credentials,
            navigator,
        }
    }

    /// The stored token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.credentials.get()
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}
