//! In-memory stand-in for the query service, used by unit tests.
//!
//! Understands exactly the statements this crate sends and keeps documents
//! in a map keyed by (keyspace, document key).

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Only keyspaces in this bucket exist
const KNOWN_BUCKET: &str = "`travel-sample`";

#[derive(Default)]
struct Inner {
    documents: HashMap<(String, String), (u64, Value)>,
    statements: Vec<String>,
    last_cas: u64,
    reject_reads: bool,
}

type SharedState = Arc<Mutex<Inner>>;

pub struct FakeQueryService {
    addr: SocketAddr,
    state: SharedState,
    server: JoinHandle<()>,
}

impl FakeQueryService {
    pub const USERNAME: &'static str = "Administrator";
    pub const PASSWORD: &'static str = "password";

    pub async fn start() -> Self {
        let state = SharedState::default();
        let app = Router::new()
            .route("/query/service", post(query_service))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            addr,
            state,
            server,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every statement received, in order, including rejected ones
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    pub fn document(&self, keyspace: &str, key: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(&(keyspace.to_string(), key.to_string()))
            .map(|(_, value)| value.clone())
    }

    /// Fail every SELECT against a keyspace while writes keep working
    pub fn reject_reads(&self) {
        self.state.lock().unwrap().reject_reads = true;
    }

    pub fn document_count(&self) -> usize {
        self.state.lock().unwrap().documents.len()
    }
}

impl Drop for FakeQueryService {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn query_service(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    handle(&state, &headers, &request)
}

fn handle(state: &SharedState, headers: &HeaderMap, request: &Value) -> Response {
    let statement = request["statement"].as_str().unwrap_or_default();
    let args = request["args"].as_array().cloned().unwrap_or_default();

    let mut inner = state.lock().unwrap();
    inner.statements.push(statement.to_string());

    if !authorized(headers) {
        return failure(StatusCode::UNAUTHORIZED, 10000, "Authentication Failure");
    }

    if statement == "SELECT RAW 1" {
        return success(vec![json!(1)]);
    }

    if let Some(rest) = statement.strip_prefix("UPSERT INTO ") {
        let Some((keyspace, _)) = rest.split_once(" (KEY, VALUE)") else {
            return syntax_error();
        };
        if !keyspace.starts_with(KNOWN_BUCKET) {
            return keyspace_not_found(keyspace);
        }
        let (Some(key), Some(value)) = (args.first().and_then(Value::as_str), args.get(1)) else {
            return failure(StatusCode::BAD_REQUEST, 5010, "Missing KEY or VALUE");
        };

        inner.last_cas += 1;
        let cas = inner.last_cas;
        inner
            .documents
            .insert((keyspace.to_string(), key.to_string()), (cas, value.clone()));
        return success(vec![json!({ "cas": cas })]);
    }

    if let Some(rest) = statement.strip_prefix("SELECT META(d).cas AS cas, d AS content FROM ") {
        let Some((keyspace, _)) = rest.split_once(" AS d USE KEYS $1") else {
            return syntax_error();
        };
        if !keyspace.starts_with(KNOWN_BUCKET) {
            return keyspace_not_found(keyspace);
        }
        if inner.reject_reads {
            return failure(
                StatusCode::SERVICE_UNAVAILABLE,
                12008,
                "Error performing bulk get operation",
            );
        }
        let key = args.first().and_then(Value::as_str).unwrap_or_default();

        let rows = inner
            .documents
            .get(&(keyspace.to_string(), key.to_string()))
            .map(|(cas, value)| vec![json!({ "cas": cas, "content": value })])
            .unwrap_or_default();
        return success(rows);
    }

    syntax_error()
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!(
            "{}:{}",
            FakeQueryService::USERNAME,
            FakeQueryService::PASSWORD
        ))
    );
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false)
}

fn success(results: Vec<Value>) -> Response {
    let count = results.len();
    Json(json!({
        "requestID": "fake",
        "status": "success",
        "results": results,
        "metrics": { "resultCount": count }
    }))
    .into_response()
}

fn failure(status: StatusCode, code: u32, msg: &str) -> Response {
    (
        status,
        Json(json!({
            "requestID": "fake",
            "status": "fatal",
            "errors": [{ "code": code, "msg": msg }]
        })),
    )
        .into_response()
}

fn syntax_error() -> Response {
    failure(StatusCode::BAD_REQUEST, 3000, "syntax error")
}

fn keyspace_not_found(keyspace: &str) -> Response {
    failure(
        StatusCode::NOT_FOUND,
        12003,
        &format!("Keyspace not found in CB datastore: default:{}", keyspace),
    )
}
