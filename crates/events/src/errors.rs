//! Error types for the event domain.
//!
//! [`StoreError`] is what an [`crate::EventStore`] backend reports. The
//! dispatcher and the query service wrap it in their own error types so the
//! transport layer can pick the right generic client message without looking
//! at storage details.
//!
//! Malformed or irrelevant webhook payloads are **not** errors here; they are
//! [`crate::SkipReason`] values.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Failures reported by an event store backend.
///
/// Every variant maps to an HTTP 500 at the transport layer. The detail is
/// logged server-side and never returned to a client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("Event store unavailable: {message}")]
    Unavailable {
        /// Backend-specific description of the failure.
        message: String,
    },

    /// A document could not be encoded for storage or decoded on read.
    #[error("Event document could not be (de)serialised: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document violates the record model (e.g. an unknown kind).
    #[error("Stored event is corrupt: {message}")]
    Corrupt {
        /// Description of the invalid content.
        message: String,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for [`StoreError::Corrupt`].
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Operation errors
// ---------------------------------------------------------------------------

/// Failures while ingesting a webhook delivery.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The normalized record could not be persisted.
    #[error("Failed to store event: {0}")]
    Storage(#[from] StoreError),
}

/// Failures while reading stored events.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The store could not be queried.
    #[error("Failed to query events: {0}")]
    Storage(#[from] StoreError),
}
