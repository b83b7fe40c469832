//! Read-side queries over stored events.
//!
//! Two operations: listing recent events (optionally filtered by kind) and
//! summarising the whole history as per-kind counts. Neither paginates nor
//! windows by time; every call scans from the newest event.

use std::sync::Arc;

use serde::Serialize;

use crate::{EventFilter, EventStore, FindLimit, KindCount, QueryError, StoredEvent};

/// Number of events returned when the caller does not ask for a limit.
pub const DEFAULT_LIST_LIMIT: i64 = 10;

/// Upper bound applied to any requested limit.
pub const MAX_LIST_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Request / response shapes
// ---------------------------------------------------------------------------

/// Parameters of a list-events query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEventsRequest {
    /// Requested maximum number of events. Clamped to [`MAX_LIST_LIMIT`];
    /// values of zero or below are passed to the store unchanged (see
    /// [`FindLimit`]).
    pub limit: Option<i64>,
    /// Exact-match filter on the stored kind. An empty string means no filter.
    pub kind: Option<String>,
}

impl ListEventsRequest {
    /// The limit actually applied to the query.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
    }

    fn filter(&self) -> EventFilter {
        EventFilter {
            kind: self.kind.clone().filter(|k| !k.is_empty()),
            limit: FindLimit::new(self.effective_limit()),
        }
    }
}

/// Result of [`EventQueryService::list_events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPage {
    /// Matching events, newest first.
    pub events: Vec<StoredEvent>,
    /// Number of events in `events`.
    pub count: usize,
    /// The effective limit used for the query.
    pub limit: i64,
}

/// Result of [`EventQueryService::summarize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// Sum of all group counts.
    pub total_events: u64,
    /// Per-kind counts, largest first.
    pub event_types: Vec<KindCount>,
}

impl EventSummary {
    fn from_counts(event_types: Vec<KindCount>) -> Self {
        Self {
            total_events: event_types.iter().map(|c| c.count).sum(),
            event_types,
        }
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Answers read queries against an [`EventStore`].
#[derive(Clone)]
pub struct EventQueryService {
    store: Arc<dyn EventStore>,
}

impl EventQueryService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Lists stored events, newest first.
    #[tracing::instrument(skip_all, fields(limit = request.effective_limit(), kind = request.kind.as_deref()))]
    pub async fn list_events(&self, request: &ListEventsRequest) -> Result<EventPage, QueryError> {
        let limit = request.effective_limit();
        let events = self.store.find(request.filter()).await?;

        tracing::debug!(count = events.len(), "Listed events");
        Ok(EventPage {
            count: events.len(),
            events,
            limit,
        })
    }

    /// Counts all stored events by kind.
    #[tracing::instrument(skip_all)]
    pub async fn summarize(&self) -> Result<EventSummary, QueryError> {
        let counts = self.store.count_by_kind().await?;
        let summary = EventSummary::from_counts(counts);

        tracing::debug!(total_events = summary.total_events, "Summarised events");
        Ok(summary)
    }
}
