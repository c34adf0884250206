//! In-memory collaborators for testing.
//!
//! [`ScriptedTransport`] answers requests from a per-route script and records
//! everything it was sent; [`RecordingNavigator`] remembers navigations;
//! [`TestSession`] bundles both sides of a [`Session`](crate::Session) so a
//! test can inspect the token and the navigation log.

pub mod navigator;
pub mod session;
pub mod transport;

pub use navigator::RecordingNavigator;
pub use session::TestSession;
pub use transport::ScriptedTransport;
