//! Event domain for Hookstream.
//!
//! This crate contains the canonical stored-event model, the normalizers that
//! turn GitHub webhook payloads into that model, the ingestion dispatcher, the
//! read-side query service, and the [`EventStore`] port trait. Infrastructure
//! crates implement the trait; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is stored and queried; the `store` crate defines *where*,
//! and the `listener` crate defines *how* requests arrive.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`AuthorName`, `BranchName`, …) |
//! | [`types`] | `Timestamp` and the per-request `IngestionTime` |
//! | [`record`] | `EventRecord`, `StoredEvent`, and their kinds |
//! | [`payload`] | Optional-field views over inbound webhook bodies |
//! | [`normalize`] | Push and pull-request normalizers |
//! | [`dispatch`] | `EventDispatcher`: routes, stamps, persists |
//! | [`query`] | `EventQueryService`: list and summarise |
//! | [`store`] | `EventStore` port trait and query shapes |
//! | [`errors`] | Storage, ingestion, and query error types |

pub mod dispatch;
pub mod errors;
pub mod identifiers;
pub mod normalize;
pub mod payload;
pub mod query;
pub mod record;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use dispatch::{EventDispatcher, IgnoreReason, IngestOutcome, WebhookEventKind};
pub use errors::{IngestError, QueryError, StoreError};
pub use identifiers::{AuthorName, BranchName, PullRequestNumber, RepositoryName};
pub use normalize::{normalize_pull_request, normalize_push, Normalized, SkipReason};
pub use query::{
    EventPage, EventQueryService, EventSummary, ListEventsRequest, DEFAULT_LIST_LIMIT,
    MAX_LIST_LIMIT,
};
pub use record::{
    EventDetails, EventKind, EventRecord, PullRequestAction, PullRequestDetails, StoredEvent,
    UnknownEventKind,
};
pub use store::{sort_kind_counts, EventFilter, EventStore, FindLimit, KindCount};
pub use types::{IngestionTime, Timestamp, MESSAGE_TIME_FORMAT};
