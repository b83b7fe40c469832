//! The canonical event record shape.
//!
//! A normalizer produces an [`EventRecord`]; only the dispatcher can turn it
//! into a [`StoredEvent`] by stamping the ingestion timestamp and the raw
//! inbound event category. The kind-specific fields live in [`EventDetails`],
//! which is flattened into the record on the wire so stored documents look
//! like:
//!
//! ```json
//! {"type": "push", "branch": "main", "message": "...", "author": "alice",
//!  "repository": "repo1", "timestamp": "2024-03-05T14:07:00Z", "event_type": "push"}
//! ```

use serde::{Deserialize, Serialize};

use crate::{AuthorName, BranchName, PullRequestNumber, RepositoryName, Timestamp};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The canonical category of a stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A push to a branch.
    Push,
    /// A pull request was opened.
    PullRequest,
    /// A pull request was closed with its changes merged.
    Merge,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 3] = [EventKind::Push, EventKind::PullRequest, EventKind::Merge];

    /// Returns the wire name of this kind (`"push"`, `"pull_request"`, `"merge"`).
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::Merge => "merge",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Returned when a string does not name an [`EventKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event kind '{0}'")]
pub struct UnknownEventKind(pub String);

// ---------------------------------------------------------------------------

/// The pull request actions that produce a stored event.
///
/// Every other action GitHub sends (`reopened`, `synchronize`, `labeled`, …)
/// is ignored before a record is built, so it has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Closed,
}

impl PullRequestAction {
    /// Parses a webhook `action` value, returning `None` for actions that are
    /// not recorded.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "opened" => Some(Self::Opened),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Fields shared by `pull_request` and `merge` records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetails {
    /// Head (source) branch of the pull request.
    pub from_branch: BranchName,
    /// Base (target) branch of the pull request.
    pub to_branch: BranchName,
    pub pr_number: PullRequestNumber,
    /// The webhook action that produced the record.
    pub action: PullRequestAction,
}

/// Kind-specific fields of an [`EventRecord`], tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventDetails {
    Push {
        /// Destination branch of the push.
        branch: BranchName,
    },
    PullRequest(PullRequestDetails),
    Merge(PullRequestDetails),
}

impl EventDetails {
    /// The canonical kind these details belong to.
    pub fn kind(&self) -> EventKind {
        match self {
            EventDetails::Push { .. } => EventKind::Push,
            EventDetails::PullRequest(_) => EventKind::PullRequest,
            EventDetails::Merge(_) => EventKind::Merge,
        }
    }
}

/// A fully-populated, normalized event as produced by a normalizer.
///
/// Carries no ingestion metadata; see [`StoredEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub details: EventDetails,
    /// Human-readable rendered summary.
    pub message: String,
    pub author: AuthorName,
    pub repository: RepositoryName,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        self.details.kind()
    }
}

/// An [`EventRecord`] stamped with ingestion metadata: the persisted document.
///
/// Instances are only constructed by the dispatcher (or deserialised back out
/// of a store). There is no way to modify one after it has been stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    #[serde(flatten)]
    pub record: EventRecord,
    /// Ingestion instant; never taken from the payload.
    pub timestamp: Timestamp,
    /// The raw `X-GitHub-Event` value the record was ingested under.
    pub event_type: String,
}

impl StoredEvent {
    pub(crate) fn stamp(record: EventRecord, timestamp: Timestamp, event_type: &str) -> Self {
        Self {
            record,
            timestamp,
            event_type: event_type.to_string(),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.record.kind()
    }
}
