//! # Roost API
//!
//! Authenticated REST client for the Roost social backend.
//!
//! - [`ApiClient`]: attaches the bearer token and performs at most one
//!   transparent refresh-and-retry per request
//! - [`Session`]: the credential store and navigator the client acts on
//! - [`HttpTransport`]: the wire seam, with [`ReqwestTransport`] for real
//!   backends and [`mocks::ScriptedTransport`] for tests
//! - [`normalize`]: turns any failure into a displayable message
//!
//! # Example
//!
//! ```no_run
//! use roost_api::{ApiClient, ClientConfig, LoginRequest, ReqwestTransport, Session};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env();
//! let client = ApiClient::new(ReqwestTransport::new(&config)?, Session::from_config(&config)?);
//!
//! let login = client.login(&LoginRequest::local("ada@example.com", "secret")).await?;
//! println!("hello {}", login.user.nickname);
//!
//! // A 401 here is refreshed and retried once behind the scenes.
//! let feed = client.posts().await?;
//! # let _ = feed;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
mod endpoints;
pub mod error;
pub mod models;
pub mod navigator;
pub mod normalize;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use client::{ApiClient, REFRESH_PATH};
pub use config::ClientConfig;
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ApiError, ConfigError, CredentialError, Result, TransportError};
pub use models::*;
pub use navigator::{LOGIN_PATH, Navigator, TracingNavigator};
pub use normalize::{UNKNOWN_ERROR, error_message, normalize_message};
pub use session::Session;
pub use transport::{ApiRequest, ApiResponse, Attempt, HttpTransport, ReqwestTransport};

pub use reqwest::Method;
