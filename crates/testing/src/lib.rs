//! Loopback HTTP stub standing in for the VoiceForge platform and the n8n
//! automation engine in tests.
//!
//! Responses are scripted per `(method, path)`; unscripted routes answer
//! `404 {"error":"no stub"}`. Every request is recorded so tests can assert
//! on exactly what was sent upstream.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A request observed by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub raw_body: String,
}

impl RecordedRequest {
    /// Returns a header value by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns decoded query pairs in the order they were sent.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .as_deref()
            .map(|query| url::form_urlencoded::parse(query.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
struct ScriptedResponse {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<(String, String), ScriptedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Running stub upstream bound to `127.0.0.1` on an ephemeral port.
pub struct StubUpstream {
    address: SocketAddr,
    state: Arc<StubState>,
    cancellation_token: CancellationToken,
    server_handle: JoinHandle<()>,
}

impl StubUpstream {
    /// Binds the stub and starts serving in a background task.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let router = Router::new().fallback(handle_request).with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub upstream");
        let address = listener.local_addr().expect("stub upstream address");
        let cancellation_token = CancellationToken::new();

        let server_handle = tokio::spawn({
            let shutdown = cancellation_token.child_token();
            async move {
                let _ = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        shutdown.cancelled().await;
                    })
                    .await;
            }
        });

        Self {
            address,
            state,
            cancellation_token,
            server_handle,
        }
    }

    /// Base URL of the stub, without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Scripts a JSON response for `method path`.
    pub fn respond(&self, method: &str, path: &str, status: u16, body: Value) {
        self.script(method, path, status, "application/json", body.to_string());
    }

    /// Scripts a raw text response for `method path`.
    pub fn respond_text(&self, method: &str, path: &str, status: u16, body: &str) {
        self.script(method, path, status, "text/plain", body.to_string());
    }

    fn script(&self, method: &str, path: &str, status: u16, content_type: &'static str, body: String) {
        let status = StatusCode::from_u16(status).expect("valid status code");
        lock(&self.state.routes).insert(
            (method.to_ascii_uppercase(), path.to_string()),
            ScriptedResponse {
                status,
                content_type,
                body,
            },
        );
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }

    /// Requests matching `method path`.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method.eq_ignore_ascii_case(method) && request.path == path)
            .collect()
    }

    /// Requests with a method other than GET.
    pub fn mutating_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method != "GET")
            .collect()
    }

    /// Stops the server and waits for it to exit.
    pub async fn stop(self) {
        self.cancellation_token.cancel();
        let _ = self.server_handle.await;
    }
}

async fn handle_request(State(state): State<Arc<StubState>>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let raw_body = String::from_utf8_lossy(&body).into_owned();
    let recorded = RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers: headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str().to_string(), value.to_string())))
            .collect(),
        body: serde_json::from_str(&raw_body).ok(),
        raw_body,
    };
    let key = (recorded.method.clone(), recorded.path.clone());
    lock(&state.requests).push(recorded);

    let scripted = lock(&state.routes).get(&key).cloned();
    match scripted {
        Some(response) => (response.status, [(header::CONTENT_TYPE, response.content_type)], response.body).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"error":"no stub"}"#.to_string(),
        )
            .into_response(),
    }
}
