//! In-process stand-in for the shaping-control service.
//!
//! Speaks the same per-address resource as the real service, keeps profiles
//! in memory, records every request, and can be told to fail or stall.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub address: String,
    pub real_ip: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct ServiceState {
    profiles: Mutex<BTreeMap<String, Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
    read_failures: Mutex<HashMap<String, StatusCode>>,
    write_failures: Mutex<HashMap<String, StatusCode>>,
    read_delay: Mutex<Option<Duration>>,
}

impl ServiceState {
    pub fn put(&self, address: &str, parameters: Value) {
        self.profiles.lock().unwrap().insert(address.to_string(), parameters);
    }

    pub fn profile(&self, address: &str) -> Option<Value> {
        self.profiles.lock().unwrap().get(address).cloned()
    }

    pub fn fail_reads(&self, address: &str, status: StatusCode) {
        self.read_failures.lock().unwrap().insert(address.to_string(), status);
    }

    pub fn fail_writes(&self, address: &str, status: StatusCode) {
        self.write_failures.lock().unwrap().insert(address.to_string(), status);
    }

    pub fn stall_reads(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests().into_iter().filter(|r| r.method == "POST").collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record(&self, request: RecordedRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

pub struct FakeShapingService {
    pub addr: SocketAddr,
    pub state: Arc<ServiceState>,
    handle: JoinHandle<()>,
}

impl FakeShapingService {
    pub async fn start() -> Self {
        let state = Arc::new(ServiceState::default());
        let app = Router::new()
            .route("/api/v1/shape/:address/", get(get_shape).post(post_shape))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state, handle }
    }

    /// `host:port`, the way the CLI takes it.
    pub fn host(&self) -> String {
        self.addr.to_string()
    }
}

impl Drop for FakeShapingService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_shape(State(state): State<Arc<ServiceState>>, Path(address): Path<String>) -> Response {
    state.record(RecordedRequest {
        method: "GET",
        address: address.clone(),
        real_ip: None,
        body: None,
    });

    let delay = *state.read_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let failure = state.read_failures.lock().unwrap().get(&address).copied();
    if let Some(status) = failure {
        return (status, "injected failure").into_response();
    }

    match state.profile(&address) {
        Some(parameters) => Json(parameters).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response(),
    }
}

async fn post_shape(
    State(state): State<Arc<ServiceState>>,
    Path(address): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    state.record(RecordedRequest {
        method: "POST",
        address: address.clone(),
        real_ip: real_ip.clone(),
        body: Some(body.clone()),
    });

    let failure = state.write_failures.lock().unwrap().get(&address).copied();
    if let Some(status) = failure {
        return (status, "injected failure").into_response();
    }

    // the real service only lets a trusted host write on behalf of the address it names
    if real_ip.as_deref() != Some(address.as_str()) {
        return (StatusCode::FORBIDDEN, "X-Real-IP does not match target").into_response();
    }

    state.put(&address, body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}
