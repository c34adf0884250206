//! Error normalization.
//!
//! Every failure shown to a user goes through [`error_message`]: the server's
//! own `message` wins, then the transport's message, then
//! [`UNKNOWN_ERROR`]. Empty strings count as absent.

use crate::error::ApiError;

/// Fallback when a failure carries no usable text.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Pick the displayable message from the two candidate sources.
#[must_use]
pub fn normalize_message(server: Option<&str>, transport: Option<&str>) -> String {
    server
        .filter(|message| !message.is_empty())
        .or_else(|| transport.filter(|message| !message.is_empty()))
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

/// Displayable message for an API failure.
///
/// A status error without a server message falls back to its generic
/// `"Request failed with status code <n>"` text.
#[must_use]
pub fn error_message(error: &ApiError) -> String {
    let generic = error.to_string();
    normalize_message(error.server_message(), Some(&generic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use proptest::prelude::*;

    #[test]
    fn server_message_wins() {
        let error = ApiError::Status {
            status: 400,
            message: Some("Nickname is taken".to_string()),
            body: String::new(),
        };
        assert_eq!(error_message(&error), "Nickname is taken");
    }

    #[test]
    fn status_without_message_uses_generic_text() {
        let error = ApiError::Status {
            status: 500,
            message: None,
            body: String::new(),
        };
        assert_eq!(error_message(&error), "Request failed with status code 500");
    }

    #[test]
    fn empty_server_message_falls_through() {
        let error = ApiError::Status {
            status: 404,
            message: Some(String::new()),
            body: String::new(),
        };
        assert_eq!(error_message(&error), "Request failed with status code 404");
    }

    #[test]
    fn transport_message_is_used() {
        let error = ApiError::from(TransportError::Request("socket hang up".to_string()));
        assert_eq!(error_message(&error), "socket hang up");
    }

    #[test]
    fn nothing_yields_unknown_error() {
        let error = ApiError::from(TransportError::Request(String::new()));
        assert_eq!(error_message(&error), UNKNOWN_ERROR);
        assert_eq!(normalize_message(None, None), UNKNOWN_ERROR);
    }

    proptest! {
        #[test]
        fn non_empty_server_message_always_wins(server in ".+", transport in ".*") {
            prop_assert_eq!(normalize_message(Some(&server), Some(&transport)), server);
        }
    }
}
