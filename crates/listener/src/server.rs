//! Socket-facing HTTP server.
//!
//! `tiny_http` accepts connections on its own threads and hands out requests
//! through a blocking `recv`. [`WebhookServer::run`] pulls requests on the
//! tokio blocking pool and spawns one task per request, so slow store calls
//! for one delivery never hold up the next.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::Instrument;

use crate::api::{cors_headers, handle_request, ApiMethod, ApiRequest, ApiResponse, ApiState};
use crate::ListenerError;

impl ApiMethod {
    fn from_http(method: &tiny_http::Method) -> Self {
        match method {
            tiny_http::Method::Get => Self::Get,
            tiny_http::Method::Post => Self::Post,
            tiny_http::Method::Options => Self::Options,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Stops a running [`WebhookServer`] from another task.
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<tiny_http::Server>,
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Makes [`WebhookServer::run`] return after the request it is currently
    /// waiting for (or immediately, if idle). In-flight requests complete.
    pub fn shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.server.unblock();
    }
}

/// The bound HTTP listener serving the webhook and read API.
pub struct WebhookServer {
    server: Arc<tiny_http::Server>,
    state: ApiState,
    requested: Arc<AtomicBool>,
}

impl WebhookServer {
    /// Binds `addr` (e.g. `0.0.0.0:5000`; port `0` picks a free port).
    pub fn bind(addr: &str, state: ApiState) -> Result<Self, ListenerError> {
        let server = tiny_http::Server::http(addr).map_err(|e| ListenerError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            server: Arc::new(server),
            state,
            requested: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The address actually bound, when listening on TCP.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
            requested: Arc::clone(&self.requested),
        }
    }

    /// Serves requests until [`ShutdownHandle::shutdown`] is called.
    pub async fn run(self) -> Result<(), ListenerError> {
        tracing::info!(addr = ?self.local_addr(), "Webhook server listening");

        while !self.requested.load(Ordering::SeqCst) {
            let server = Arc::clone(&self.server);
            let received = tokio::task::spawn_blocking(move || server.recv()).await?;

            if self.requested.load(Ordering::SeqCst) {
                break;
            }

            let request = received?;
            let state = self.state.clone();
            let span = tracing::info_span!(
                "http_request",
                method = %request.method(),
                url = %request.url(),
            );
            tokio::spawn(serve_request(state, request).instrument(span));
        }

        tracing::info!("Webhook server stopped");
        Ok(())
    }
}

async fn serve_request(state: ApiState, request: tiny_http::Request) {
    let method = ApiMethod::from_http(request.method());
    let url = request.url().to_string();
    let headers: Vec<(String, String)> = request
        .headers()
        .iter()
        .map(|h| (h.field.to_string(), h.value.to_string()))
        .collect();

    let read = tokio::task::spawn_blocking(move || {
        let mut request = request;
        let mut body = Vec::new();
        let result = request.as_reader().read_to_end(&mut body);
        (request, result.map(|_| body))
    })
    .await;

    let (request, body) = match read {
        Ok(read) => read,
        Err(e) => {
            tracing::error!(error = %e, "Request body task failed");
            return;
        }
    };

    let response = match body {
        Ok(body) => {
            let api_request = ApiRequest {
                method,
                url,
                headers,
                body,
            };
            handle_request(&state, &api_request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            ApiResponse {
                status: 400,
                body: Some(serde_json::json!({ "error": "Failed to read request body" })),
            }
        }
    };

    tracing::info!(status = response.status, "Request handled");
    let written = tokio::task::spawn_blocking(move || request.respond(to_http(&response))).await;
    match written {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Failed to write response"),
        Err(e) => tracing::error!(error = %e, "Response task failed"),
    }
}

fn to_http(response: &ApiResponse) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut http = tiny_http::Response::from_data(response.body_bytes())
        .with_status_code(response.status);

    if response.body.is_some() {
        if let Ok(header) =
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        {
            http = http.with_header(header);
        }
    }
    for (name, value) in cors_headers() {
        if let Ok(header) = tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            http = http.with_header(header);
        }
    }
    http
}
