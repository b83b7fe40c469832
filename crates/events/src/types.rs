//! Shared value types for the event domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! behaviour: [`Timestamp`] knows how to render itself for event messages, and
//! [`IngestionTime`] pins one instant and its display form together so every
//! normalizer invoked for a request sees the same value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `strftime` pattern used when a timestamp is embedded in an event message.
///
/// Renders as e.g. `05 March 2024 - 02:07 PM UTC`.
pub const MESSAGE_TIME_FORMAT: &str = "%d %B %Y - %I:%M %p UTC";

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API. Serialises as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Renders the timestamp in the human-readable form used inside event
    /// messages (see [`MESSAGE_TIME_FORMAT`]).
    pub fn to_message_format(self) -> String {
        self.0.format(MESSAGE_TIME_FORMAT).to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------

/// The single instant at which a webhook delivery was ingested, together with
/// its pre-rendered message form.
///
/// Computed once per request by the dispatcher. The instant is stamped onto
/// the stored record; the display string is handed to the normalizer for the
/// message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionTime {
    at: Timestamp,
    display: String,
}

impl IngestionTime {
    /// Captures `at` and renders its message form.
    pub fn new(at: Timestamp) -> Self {
        Self {
            at,
            display: at.to_message_format(),
        }
    }

    /// Captures the current instant.
    pub fn now() -> Self {
        Self::new(Timestamp::now())
    }

    /// The ingestion instant.
    pub fn at(&self) -> Timestamp {
        self.at
    }

    /// The instant rendered with [`MESSAGE_TIME_FORMAT`].
    pub fn display(&self) -> &str {
        &self.display
    }
}
