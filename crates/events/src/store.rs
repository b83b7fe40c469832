//! The event storage port.
//!
//! [`EventStore`] is the capability the dispatcher and query service are
//! constructed with. It mirrors the three document-store primitives the
//! domain needs: single-document insert, filtered/sorted/limited find, and a
//! group-by-kind count. There is deliberately no update or delete operation.
//!
//! Implementations live in the `store` crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{EventKind, StoreError, StoredEvent};

// ---------------------------------------------------------------------------
// Query shapes
// ---------------------------------------------------------------------------

/// How many documents a [`EventStore::find`] call may return.
///
/// Follows document-store cursor semantics so that any caller-supplied value
/// has a defined meaning:
///
/// - `0`: no limit.
/// - `n > 0`: at most `n` documents.
/// - `n < 0`: at most `|n|` documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FindLimit(i64);

impl FindLimit {
    pub fn new(limit: i64) -> Self {
        Self(limit)
    }

    /// Returns the raw limit value as supplied.
    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// The maximum number of documents to return, or `None` when unbounded.
    pub fn max_documents(self) -> Option<usize> {
        match self.0 {
            0 => None,
            n => Some(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX)),
        }
    }
}

/// Selection criteria for [`EventStore::find`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Exact match on the stored `type` field. `None` matches everything.
    ///
    /// Kept as a raw string: filtering by a name that is not a known
    /// [`EventKind`] is valid and simply matches nothing.
    pub kind: Option<String>,
    pub limit: FindLimit,
}

/// One group produced by [`EventStore::count_by_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    #[serde(rename = "_id")]
    pub kind: EventKind,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// Append-only storage for [`StoredEvent`] documents.
///
/// Implementations must provide atomic single-document inserts and make an
/// inserted document visible to subsequent reads. Storage identifiers are
/// internal to the implementation and never appear in returned documents.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists one event.
    async fn insert(&self, event: StoredEvent) -> Result<(), StoreError>;

    /// Returns events matching `filter`, newest `timestamp` first. Events with
    /// equal timestamps are returned most-recently-inserted first.
    async fn find(&self, filter: EventFilter) -> Result<Vec<StoredEvent>, StoreError>;

    /// Counts stored events per kind, ordered by count descending and then by
    /// kind name ascending. Kinds with no events are omitted.
    async fn count_by_kind(&self) -> Result<Vec<KindCount>, StoreError>;
}

/// Orders kind counts by count descending, then kind name ascending.
///
/// Shared by backends that aggregate in memory.
pub fn sort_kind_counts(counts: &mut [KindCount]) {
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()))
    });
}
