//! Listener error types.

use thiserror::Error;

/// Failures of the HTTP listener itself (not of individual requests, which
/// are always answered with a status code).
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listening socket could not be opened.
    #[error("Failed to bind {addr}: {message}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Reason reported by the HTTP server.
        message: String,
    },

    /// Accepting the next connection failed.
    #[error("Failed to accept request: {0}")]
    Accept(#[from] std::io::Error),

    /// The blocking accept task panicked or was cancelled.
    #[error("Accept task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
