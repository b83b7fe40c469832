//! Webhook ingestion dispatcher.
//!
//! Routes an inbound payload to the normalizer for its declared event kind,
//! stamps the resulting record with ingestion metadata, and persists it.
//!
//! ## Outcomes
//!
//! | Declared kind | Normalizer result | Outcome |
//! |---------------|-------------------|---------|
//! | `push` / `pull_request` | record | [`IngestOutcome::Stored`] |
//! | `push` / `pull_request` | skipped | [`IngestOutcome::Ignored`] |
//! | anything else | - | [`IngestOutcome::Ignored`], store untouched |
//!
//! Only a storage failure produces an [`IngestError`].

use std::sync::Arc;

use serde_json::Value;

use crate::normalize::{normalize_pull_request, normalize_push, Normalized, SkipReason};
use crate::{EventKind, EventStore, IngestError, IngestionTime, StoredEvent};

// ---------------------------------------------------------------------------
// Inbound kinds
// ---------------------------------------------------------------------------

/// The `X-GitHub-Event` header value, classified.
///
/// GitHub sends dozens of event kinds; the ones this service does not record
/// are kept as [`WebhookEventKind::Other`] so they are handled by an explicit
/// fallback arm rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventKind {
    Push,
    PullRequest,
    /// Any other event kind, with its raw header value.
    Other(String),
}

impl WebhookEventKind {
    pub fn parse(header: &str) -> Self {
        match header {
            "push" => Self::Push,
            "pull_request" => Self::PullRequest,
            other => Self::Other(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Why a delivery was acknowledged without storing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The declared event kind is not one this service records.
    UnhandledEventType(String),
    /// The normalizer declined the payload.
    Skipped(SkipReason),
}

impl IgnoreReason {
    /// The reason to echo back to the webhook sender, if any.
    ///
    /// Unhandled event types are reported; normalizer skip details stay in
    /// the server log.
    pub fn client_reason(&self) -> Option<String> {
        match self {
            IgnoreReason::UnhandledEventType(kind) => {
                Some(format!("Unhandled event type: {kind}"))
            }
            IgnoreReason::Skipped(_) => None,
        }
    }
}

/// Successful result of [`EventDispatcher::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A record of the given kind was persisted.
    Stored { kind: EventKind },
    /// Nothing was persisted; this is not a failure.
    Ignored(IgnoreReason),
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Normalizes and persists webhook deliveries.
#[derive(Clone)]
pub struct EventDispatcher {
    store: Arc<dyn EventStore>,
}

impl EventDispatcher {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Ingests one delivery, using the current instant as its ingestion time.
    ///
    /// `event_type` is the raw `X-GitHub-Event` header value.
    pub async fn ingest(
        &self,
        event_type: &str,
        payload: &Value,
    ) -> Result<IngestOutcome, IngestError> {
        self.ingest_at(event_type, payload, IngestionTime::now())
            .await
    }

    /// Ingests one delivery with an explicit ingestion time.
    ///
    /// The same `time` is used for the message text and the stored
    /// `timestamp`.
    #[tracing::instrument(skip_all, fields(event_type = %event_type))]
    pub async fn ingest_at(
        &self,
        event_type: &str,
        payload: &Value,
        time: IngestionTime,
    ) -> Result<IngestOutcome, IngestError> {
        let normalized = match WebhookEventKind::parse(event_type) {
            WebhookEventKind::Push => normalize_push(payload, time.display()),
            WebhookEventKind::PullRequest => normalize_pull_request(payload, time.display()),
            WebhookEventKind::Other(kind) => {
                tracing::info!("Unhandled event type");
                return Ok(IngestOutcome::Ignored(IgnoreReason::UnhandledEventType(kind)));
            }
        };

        let record = match normalized {
            Normalized::Record(record) => record,
            Normalized::Skipped(reason) => {
                return Ok(IngestOutcome::Ignored(IgnoreReason::Skipped(reason)));
            }
        };

        let kind = record.kind();
        let event = StoredEvent::stamp(record, time.at(), event_type);
        self.store.insert(event).await?;

        tracing::info!(%kind, "Stored event");
        Ok(IngestOutcome::Stored { kind })
    }
}
