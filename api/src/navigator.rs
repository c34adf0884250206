//! Navigation requests raised by the client.
//!
//! The only navigation the client core ever asks for is the forced move to
//! the login entry point after an unrecoverable refresh failure.

/// Login entry point.
pub const LOGIN_PATH: &str = "/login";

/// Receives navigation requests; the presentation layer decides what a path
/// means.
pub trait Navigator: Send + Sync {
    /// Move the user to `path`.
    fn navigate(&self, path: &str);
}

/// Navigator that only logs the request.
///
/// Used by headless front-ends (the demo binary) that have nowhere to go.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        tracing::warn!(path, "Navigation requested");
    }
}
