//! Scripted transport for testing.

use crate::error::TransportError;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use reqwest::Method;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

type Outcome = Result<ApiResponse, TransportError>;

struct Route {
    method: Method,
    path: String,
    outcomes: VecDeque<Outcome>,
    gate: Option<Arc<Notify>>,
}

impl Route {
    /// Queued outcomes are consumed in order; the last one repeats.
    fn next_outcome(&mut self) -> Option<Outcome> {
        if self.outcomes.len() > 1 {
            self.outcomes.pop_front()
        } else {
            self.outcomes.front().cloned()
        }
    }
}

#[derive(Default)]
struct Script {
    routes: Vec<Route>,
    requests: Vec<ApiRequest>,
}

impl Script {
    fn route(&mut self, method: &Method, path: &str) -> &mut Route {
        let index = match self
            .routes
            .iter()
            .position(|r| r.method == *method && r.path == path)
        {
            Some(index) => index,
            None => {
                self.routes.push(Route {
                    method: method.clone(),
                    path: path.to_string(),
                    outcomes: VecDeque::new(),
                    gate: None,
                });
                self.routes.len() - 1
            },
        };
        &mut self.routes[index]
    }
}

/// [`HttpTransport`] answering from a per-route script.
///
/// Routes are matched on method and path (query ignored). Unscripted routes
/// answer 404. Clones share the script and the request log.
///
/// # Example
///
/// ```
/// use roost_api::mocks::ScriptedTransport;
/// use roost_api::ApiResponse;
/// use reqwest::Method;
///
/// let transport = ScriptedTransport::new()
///     .on(Method::GET, "/auth/me", ApiResponse::empty(401))
///     .on(Method::GET, "/auth/me", ApiResponse::json(200, &serde_json::json!({"id": 1})));
/// ```
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    /// Transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `response` for `method path`.
    #[must_use]
    pub fn on(self, method: Method, path: &str, response: ApiResponse) -> Self {
        self.lock()
            .route(&method, path)
            .outcomes
            .push_back(Ok(response));
        self
    }

    /// Queue a transport failure for `method path`.
    #[must_use]
    pub fn on_error(self, method: Method, path: &str, error: TransportError) -> Self {
        self.lock()
            .route(&method, path)
            .outcomes
            .push_back(Err(error));
        self
    }

    /// Hold every answer on `method path` until the returned gate is
    /// notified. Each `notify_one` releases one request.
    #[must_use]
    pub fn gate(&self, method: Method, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().route(&method, path).gate = Some(Arc::clone(&gate));
        gate
    }

    /// Every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Requests received on `method path`.
    #[must_use]
    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<ApiRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .cloned()
            .collect()
    }

    /// Number of requests received on `method path`.
    #[must_use]
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let script = self.lock();
        f.debug_struct("ScriptedTransport")
            .field("routes", &script.routes.len())
            .field("requests", &script.requests.len())
            .finish()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let (gate, outcome) = {
            let mut script = self.lock();
            script.requests.push(request.clone());
            let route = script.route(&request.method, &request.path);
            (route.gate.clone(), route.next_outcome())
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        outcome.unwrap_or_else(|| {
            Ok(ApiResponse::json(
                404,
                &serde_json::json!({
                    "message": format!("No scripted response for {} {}", request.method, request.path)
                }),
            ))
        })
    }
}
