//! In-process mock of the upstream clinical API for tests.
//!
//! Each page has a queue of scripted responses. A request pops the front
//! of its page's queue; the last response repeats once the queue is down
//! to one entry. Pages with no script answer `200 []`.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;

use super::backoff::Sleeper;
use super::client::API_KEY_HEADER;

pub(crate) const TEST_API_KEY: &str = "test-api-key";

#[derive(Debug, Clone)]
pub(crate) enum ScriptedBody {
    Json(Value),
    Raw(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ScriptedResponse {
    status: u16,
    body: ScriptedBody,
    headers: Vec<(&'static str, String)>,
}

impl ScriptedResponse {
    pub(crate) fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ScriptedBody::Json(body),
            headers: Vec::new(),
        }
    }

    pub(crate) fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: ScriptedBody::Raw(body.to_string()),
            headers: Vec::new(),
        }
    }

    pub(crate) fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = match self.body {
            ScriptedBody::Json(v) => (status, Json(v)).into_response(),
            ScriptedBody::Raw(s) => (status, s).into_response(),
        };
        for (name, value) in self.headers {
            if let Ok(v) = axum::http::HeaderValue::from_str(&value) {
                response.headers_mut().insert(name, v);
            }
        }
        response
    }
}

/// One request observed by the mock's list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

#[derive(Default)]
struct MockState {
    pages: Mutex<HashMap<u32, VecDeque<ScriptedResponse>>>,
    page_requests: Mutex<Vec<PageRequest>>,
    submissions: Mutex<Vec<Value>>,
    submit_response: Mutex<Option<ScriptedResponse>>,
}

#[derive(Deserialize)]
struct PageQuery {
    page: u32,
    limit: u32,
}

/// Handle to a running mock upstream. The server stops when dropped.
pub(crate) struct MockUpstream {
    pub base_url: String,
    state: Arc<MockState>,
    _shutdown_tx: oneshot::Sender<()>,
}

impl MockUpstream {
    pub(crate) async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/api/patients", get(list_patients))
            .route("/api/submit-assessment", post(submit_assessment))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub(crate) fn script_page(&self, page: u32, responses: Vec<ScriptedResponse>) {
        self.state
            .pages
            .lock()
            .unwrap()
            .insert(page, responses.into());
    }

    pub(crate) fn script_submit(&self, response: ScriptedResponse) {
        *self.state.submit_response.lock().unwrap() = Some(response);
    }

    pub(crate) fn page_requests(&self) -> Vec<PageRequest> {
        self.state.page_requests.lock().unwrap().clone()
    }

    pub(crate) fn submissions(&self) -> Vec<Value> {
        self.state.submissions.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == TEST_API_KEY)
}

fn unauthorized() -> Response {
    ScriptedResponse::status(401, serde_json::json!({"error": "Invalid API key"})).into_response()
}

async fn list_patients(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.page_requests.lock().unwrap().push(PageRequest {
        page: query.page,
        limit: query.limit,
    });

    let scripted = {
        let mut pages = state.pages.lock().unwrap();
        match pages.get_mut(&query.page) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    scripted
        .unwrap_or_else(|| ScriptedResponse::ok(serde_json::json!([])))
        .into_response()
}

async fn submit_assessment(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.submissions.lock().unwrap().push(body);
    let scripted = state.submit_response.lock().unwrap().clone();
    scripted
        .unwrap_or_else(|| ScriptedResponse::ok(serde_json::json!({"success": true})))
        .into_response()
}

/// Build `n` well-formed patient records with ids `P{start}..`.
pub(crate) fn patients(start: usize, n: usize) -> Value {
    Value::Array(
        (start..start + n)
            .map(|i| {
                serde_json::json!({
                    "patient_id": format!("P{i:03}"),
                    "name": format!("Patient {i}"),
                    "age": 30 + (i % 50),
                    "gender": "F",
                    "blood_pressure": "118/76",
                    "temperature": 98.4,
                    "visit_date": "2024-01-15",
                    "diagnosis": "Routine",
                    "medications": "None"
                })
            })
            .collect(),
    )
}

/// Records every requested wait and returns immediately.
#[derive(Clone, Default)]
pub(crate) struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.waits.lock().unwrap().push(duration);
        std::future::ready(())
    }
}

/// Never finishes waiting; only cancellation gets past it.
#[derive(Clone, Copy, Default)]
pub(crate) struct StalledSleeper;

impl Sleeper for StalledSleeper {
    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        std::future::pending()
    }
}
