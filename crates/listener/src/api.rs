//! Transport-independent request handling.
//!
//! [`handle_request`] maps an [`ApiRequest`] to an [`ApiResponse`]. It owns
//! routing, request validation, and the translation of domain outcomes into
//! status codes and JSON bodies. The socket-facing code in [`crate::server`]
//! only converts to and from `tiny_http` types.
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/` | health check |
//! | `POST` | `/webhook` | ingest a GitHub delivery |
//! | `GET` | `/events` | list recent events (`limit`, `type`) |
//! | `GET` | `/events/summary` | per-kind counts |
//! | `OPTIONS` | any | CORS preflight (204) |

use std::collections::HashMap;
use std::num::IntErrorKind;
use std::sync::Arc;

use events::{
    EventDispatcher, EventQueryService, EventStore, IngestOutcome, ListEventsRequest, Timestamp,
    MAX_LIST_LIMIT,
};
use serde_json::{json, Value};

/// Header GitHub uses to declare the event kind of a delivery.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

const ROUTES: [&str; 4] = ["/", "/webhook", "/events", "/events/summary"];

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// HTTP methods the API distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Options,
    /// Any other method; always answered with 404 or 405.
    Other(String),
}

/// An inbound HTTP request, already read off the wire.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: ApiMethod,
    /// Path plus optional query string, e.g. `/events?limit=5`.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn new(method: ApiMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup; the first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response ready to be written: status plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    /// The encoded body bytes (empty for bodiless responses).
    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            Some(value) => serde_json::to_vec(value).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

/// Headers attached to every response so browser dashboards on other origins
/// can read the API.
pub fn cors_headers() -> [(&'static str, &'static str); 3] {
    [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type, X-GitHub-Event"),
    ]
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Services shared by all request handlers.
#[derive(Clone)]
pub struct ApiState {
    dispatcher: EventDispatcher,
    queries: EventQueryService,
}

impl ApiState {
    /// Builds the dispatcher and query service over one shared store.
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            dispatcher: EventDispatcher::new(Arc::clone(&store)),
            queries: EventQueryService::new(store),
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Handles one request. Never fails: every outcome is a status code.
pub async fn handle_request(state: &ApiState, request: &ApiRequest) -> ApiResponse {
    let (path, query) = split_url(&request.url);

    match (&request.method, path) {
        (ApiMethod::Options, _) => ApiResponse::no_content(),
        (ApiMethod::Get, "/") => health(),
        (ApiMethod::Post, "/webhook") => webhook(state, request).await,
        (ApiMethod::Get, "/events") => list_events(state, &parse_query(query)).await,
        (ApiMethod::Get, "/events/summary") => summary(state).await,
        (_, path) if ROUTES.contains(&path) => ApiResponse::error(405, "Method not allowed"),
        _ => ApiResponse::error(404, "Endpoint not found"),
    }
}

fn health() -> ApiResponse {
    ApiResponse::json(
        200,
        json!({
            "status": "running",
            "message": "Webhook server is running!",
            "timestamp": Timestamp::now(),
        }),
    )
}

async fn webhook(state: &ApiState, request: &ApiRequest) -> ApiResponse {
    if !request.header("Content-Type").is_some_and(is_json_content_type) {
        return ApiResponse::error(400, "Content-Type must be application/json");
    }

    let payload: Value = match serde_json::from_slice(&request.body) {
        Ok(value) => value,
        Err(_) if request.body.iter().all(u8::is_ascii_whitespace) => {
            return ApiResponse::error(400, "No JSON data received");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected webhook with invalid JSON body");
            return ApiResponse::error(400, "Invalid JSON body");
        }
    };
    if is_empty_json(&payload) {
        return ApiResponse::error(400, "No JSON data received");
    }

    let Some(event_type) = request.header(EVENT_HEADER).filter(|v| !v.is_empty()) else {
        return ApiResponse::error(400, "Missing X-GitHub-Event header");
    };

    match state.dispatcher.ingest(event_type, &payload).await {
        Ok(IngestOutcome::Stored { .. }) => ApiResponse::json(200, json!({ "status": "success" })),
        Ok(IngestOutcome::Ignored(reason)) => match reason.client_reason() {
            Some(reason) => ApiResponse::json(200, json!({ "status": "ignored", "reason": reason })),
            None => ApiResponse::json(200, json!({ "status": "ignored" })),
        },
        Err(e) => {
            tracing::error!(error = %e, event_type, "Error processing webhook");
            ApiResponse::error(500, "Internal server error")
        }
    }
}

async fn list_events(state: &ApiState, query: &HashMap<String, String>) -> ApiResponse {
    let limit = match query.get("limit") {
        None => None,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(limit) => Some(limit),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(MAX_LIST_LIMIT),
            Err(_) => return ApiResponse::error(400, "limit must be an integer"),
        },
    };
    let request = ListEventsRequest {
        limit,
        kind: query.get("type").cloned(),
    };

    match state.queries.list_events(&request).await {
        Ok(page) => match serde_json::to_value(&page) {
            Ok(body) => ApiResponse::json(200, body),
            Err(e) => {
                tracing::error!(error = %e, "Error encoding events");
                ApiResponse::error(500, "Failed to retrieve events")
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Error retrieving events");
            ApiResponse::error(500, "Failed to retrieve events")
        }
    }
}

async fn summary(state: &ApiState) -> ApiResponse {
    match state.queries.summarize().await {
        Ok(summary) => match serde_json::to_value(&summary) {
            Ok(body) => ApiResponse::json(200, body),
            Err(e) => {
                tracing::error!(error = %e, "Error encoding summary");
                ApiResponse::error(500, "Failed to get summary")
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Error getting summary");
            ApiResponse::error(500, "Failed to get summary")
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accepts `application/json` and structured `application/*+json` types,
/// ignoring parameters such as `charset`.
fn is_json_content_type(value: &str) -> bool {
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// A body that parses but carries nothing: `null`, `false`, `0`, `""`, `[]`, `{}`.
fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn split_url(url: &str) -> (&str, &str) {
    url.split_once('?').unwrap_or((url, ""))
}

fn parse_query(query: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for (k, v) in form_urlencoded::parse(query.as_bytes()) {
        // First occurrence wins, matching how form frameworks read repeated keys.
        out.entry(k.into_owned()).or_insert_with(|| v.into_owned());
    }
    out
}
