//! Dependencies injected into every feature reducer.

use crate::notice::{Notifier, TracingNotifier};
use roost_api::{ApiClient, HttpTransport};
use std::sync::Arc;

/// API client plus notifier.
///
/// Generic over the transport so tests run the real reducers against a
/// scripted transport.
pub struct SocialEnvironment<T> {
    /// Authenticated backend client.
    pub api: ApiClient<T>,
    /// Where failure notices go.
    pub notifier: Arc<dyn Notifier>,
}

impl<T: HttpTransport> SocialEnvironment<T> {
    /// Environment over `api`, reporting to `notifier`.
    #[must_use]
    pub fn new(api: ApiClient<T>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Environment that only logs notices.
    #[must_use]
    pub fn with_tracing_notices(api: ApiClient<T>) -> Self {
        Self::new(api, Arc::new(TracingNotifier))
    }
}

impl<T> Clone for SocialEnvironment<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use test_env::TestEnvironment;

#[cfg(any(test, feature = "test-utils"))]
mod test_env {
    use super::SocialEnvironment;
    use crate::notice::RecordingNotifier;
    use roost_api::ApiClient;
    use roost_api::mocks::{ScriptedTransport, TestSession};
    use std::sync::Arc;

    /// Environment over a [`ScriptedTransport`], with handles to everything
    /// a test wants to inspect.
    pub struct TestEnvironment {
        /// The environment to hand to a reducer or store.
        pub env: SocialEnvironment<ScriptedTransport>,
        /// The transport behind `env.api`.
        pub transport: ScriptedTransport,
        /// The session behind `env.api`.
        pub session: TestSession,
        /// The notifier behind `env.notifier`.
        pub notices: Arc<RecordingNotifier>,
    }

    impl TestEnvironment {
        /// Signed-in environment (token `test-token`) over `transport`.
        #[must_use]
        pub fn new(transport: ScriptedTransport) -> Self {
            let session = TestSession::with_token("test-token");
            let notices = Arc::new(RecordingNotifier::new());
            let api = ApiClient::new(transport.clone(), session.session.clone());
            let env = SocialEnvironment::new(api, notices.clone());
            Self {
                env,
                transport,
                session,
                notices,
            }
        }
    }
}
