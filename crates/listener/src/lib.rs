//! Hookstream HTTP surface.
//!
//! Receives GitHub webhook deliveries and serves the read API over plain
//! HTTP/1.1:
//!
//! - [`api`]: transport-independent routing, validation, and status-code
//!   mapping ([`handle_request`]). Fully testable without sockets.
//! - [`server`]: the [`WebhookServer`] that binds a socket with `tiny_http`
//!   and feeds requests into [`handle_request`] on the tokio runtime.
//!
//! ## Deployment
//!
//! | Scenario | Notes |
//! |----------|-------|
//! | Local development | Expose the port with a tunnel (e.g. smee.io) and point the GitHub webhook at `/webhook` |
//! | Production | Terminate TLS in a reverse proxy in front of the listener |
//!
//! Webhook signatures are not verified; deploy behind a network boundary you
//! trust.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details and JSON response shapes live here.
//! The [`events`] crate sees only decoded payloads and header values.

pub mod api;
pub mod errors;
pub mod server;

pub use api::{handle_request, ApiMethod, ApiRequest, ApiResponse, ApiState, EVENT_HEADER};
pub use errors::ListenerError;
pub use server::{ShutdownHandle, WebhookServer};
