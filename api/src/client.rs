//! Authenticated client with transparent token refresh.
//!
//! Every request goes through [`ApiClient::dispatch`]:
//!
//! 1. the current bearer token (if any) is attached;
//! 2. on a 401 for an `Initial` request the client calls `POST /auth/refresh`
//!    (the refresh cookie rides in the transport's cookie jar), stores the
//!    new token and re-sends the request once, tagged `Retried`;
//! 3. if the refresh fails, the token is cleared, the navigator is sent to
//!    `/login`, and the *refresh* error is returned.
//!
//! A `Retried` request that gets a 401 fails like any other error, and the
//! refresh call itself never enters the cycle.

use crate::error::{ApiError, Result};
use crate::models::RefreshResponse;
use crate::session::Session;
use crate::transport::{ApiRequest, ApiResponse, Attempt, HttpTransport};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh";

struct Inner<T> {
    transport: T,
    session: Session,
}

/// Client for the social backend.
///
/// Cheap to clone; clones share the transport and the session.
pub struct ApiClient<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Client over `transport`, acting on `session`.
    #[must_use]
    pub fn new(transport: T, session: Session) -> Self {
        Self {
            inner: Arc::new(Inner { transport, session }),
        }
    }

    /// The session this client reads and writes.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Send `request` through the authentication pipeline.
    ///
    /// # Errors
    ///
    /// - the refresh error, if a 401 triggered a refresh that failed
    /// - [`ApiError::Status`] for any other non-2xx response, including a
    ///   401 on the retried request
    /// - [`ApiError::Transport`] if no response was received
    #[tracing::instrument(
        skip_all,
        name = "api_dispatch",
        fields(method = %request.method, path = %request.path)
    )]
    pub async fn dispatch(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        request.bearer = self.inner.session.token();

        match self.execute(&request).await {
            Err(error) if error.is_unauthorized() && request.attempt.may_refresh() => {
                request.attempt = Attempt::Retried;
                tracing::debug!("Access token rejected, refreshing");
                metrics::counter!("api.refresh.attempts").increment(1);

                let token = match self.renew_token().await {
                    Ok(token) => token,
                    Err(refresh_error) => {
                        tracing::warn!(error = %refresh_error, "Token refresh failed, ending session");
                        metrics::counter!("api.refresh.outcome", "result" => "failed").increment(1);
                        self.inner.session.terminate();
                        return Err(refresh_error);
                    },
                };

                metrics::counter!("api.refresh.outcome", "result" => "renewed").increment(1);
                request.bearer = Some(token);
                self.execute(&request).await
            },
            other => other,
        }
    }

    /// Explicitly renew the bearer token.
    ///
    /// Unlike a refresh triggered by a 401, a failure here leaves the
    /// session alone.
    ///
    /// # Errors
    ///
    /// Returns the refresh call's error.
    pub async fn refresh(&self) -> Result<RefreshResponse> {
        let access_token = self.renew_token().await?;
        Ok(RefreshResponse { access_token })
    }

    /// Call the refresh endpoint directly (never through `dispatch`) and
    /// store the new token.
    async fn renew_token(&self) -> Result<String> {
        let mut request = ApiRequest::new(Method::POST, REFRESH_PATH);
        request.bearer = self.inner.session.token();

        let response = self.execute(&request).await?;
        let RefreshResponse { access_token } = decode(&response)?;

        if let Err(error) = self.inner.session.replace_token(&access_token) {
            // The retried request still carries the new token.
            tracing::warn!(%error, "Failed to persist refreshed token");
        }
        Ok(access_token)
    }

    /// One round trip, mapping non-2xx responses to [`ApiError::Status`].
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let started = Instant::now();
        let outcome = self.inner.transport.execute(request).await;
        metrics::histogram!("api.request.duration_seconds")
            .record(started.elapsed().as_secs_f64());

        let response = match outcome {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(attempt = request.attempt.as_str(), %error, "Transport failure");
                metrics::counter!("api.requests", "outcome" => "transport_error").increment(1);
                return Err(error.into());
            },
        };

        tracing::debug!(
            attempt = request.attempt.as_str(),
            status = response.status,
            "Response received"
        );
        if response.is_success() {
            metrics::counter!("api.requests", "outcome" => "success").increment(1);
            Ok(response)
        } else {
            metrics::counter!("api.requests", "outcome" => "status_error").increment(1);
            Err(ApiError::from_response(&response))
        }
    }

    /// Dispatch and decode a JSON response body.
    pub(crate) async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R> {
        let response = self.dispatch(request).await?;
        decode(&response)
    }

    /// Dispatch and discard the response body.
    pub(crate) async fn send(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(request).await.map(|_| ())
    }
}

/// Serialize a request body.
pub(crate) fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

fn decode<R: DeserializeOwned>(response: &ApiResponse) -> Result<R> {
    response
        .decode()
        .map_err(|e| ApiError::Decode(e.to_string()))
}
