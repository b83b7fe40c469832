//! Webhook payload normalizers.
//!
//! A normalizer is a pure function from a raw webhook body (plus the
//! pre-rendered ingestion time) to either a fully-populated [`EventRecord`] or
//! a [`SkipReason`] explaining why nothing should be stored. Normalizers never
//! fail: a malformed payload for a known event kind is tolerated, logged, and
//! reported as [`Normalized::Skipped`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::payload::{PullRequestPayload, PushPayload};
use crate::{
    AuthorName, BranchName, EventDetails, EventRecord, PullRequestAction, PullRequestDetails,
    PullRequestNumber, RepositoryName,
};

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a normalizer produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A required field was absent or `null`. Holds the dotted field path.
    MissingField(&'static str),

    /// The payload did not have the expected JSON shape (e.g. a string where
    /// an object was expected).
    InvalidPayload(String),

    /// The payload was well-formed but describes an action that is not
    /// recorded (e.g. `reopened`, or `closed` without a merge).
    IgnoredAction(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingField(path) => write!(f, "missing field '{path}'"),
            SkipReason::InvalidPayload(detail) => write!(f, "invalid payload: {detail}"),
            SkipReason::IgnoredAction(action) => write!(f, "ignored action '{action}'"),
        }
    }
}

/// Result of running a normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// A complete record ready to be stamped and stored.
    Record(EventRecord),
    /// Nothing to store. Not an error.
    Skipped(SkipReason),
}

impl From<Result<EventRecord, SkipReason>> for Normalized {
    fn from(result: Result<EventRecord, SkipReason>) -> Self {
        match result {
            Ok(record) => Normalized::Record(record),
            Err(reason) => Normalized::Skipped(reason),
        }
    }
}

fn required<T>(value: Option<T>, path: &'static str) -> Result<T, SkipReason> {
    value.ok_or(SkipReason::MissingField(path))
}

/// Only JSON objects are payloads. Derived struct visitors also accept arrays,
/// filling fields by position.
fn parse_payload<T: DeserializeOwned>(payload: &Value) -> Result<T, SkipReason> {
    if !payload.is_object() {
        return Err(SkipReason::InvalidPayload(
            "payload is not a JSON object".to_string(),
        ));
    }
    T::deserialize(payload).map_err(|e| SkipReason::InvalidPayload(e.to_string()))
}

// ---------------------------------------------------------------------------
// push
// ---------------------------------------------------------------------------

/// Normalizes a `push` delivery.
///
/// Requires `pusher.name`, `ref` and `repository.name`. The branch is the last
/// `/`-segment of `ref`.
pub fn normalize_push(payload: &Value, formatted_time: &str) -> Normalized {
    let outcome = extract_push(payload, formatted_time);
    if let Err(reason) = &outcome {
        tracing::error!(event_type = "push", %reason, "Skipping malformed push event");
    }
    outcome.into()
}

fn extract_push(payload: &Value, formatted_time: &str) -> Result<EventRecord, SkipReason> {
    let payload: PushPayload = parse_payload(payload)?;

    let author = required(
        payload.pusher.and_then(|p| p.name),
        "pusher.name",
    )?;
    let git_ref = required(payload.git_ref, "ref")?;
    let repository = required(
        payload.repository.and_then(|r| r.name),
        "repository.name",
    )?;

    let author = AuthorName::new(author);
    let branch = BranchName::from_ref(&git_ref);
    let repository = RepositoryName::new(repository);

    Ok(EventRecord {
        message: format!(
            "\"{author}\" pushed to \"{branch}\" in \"{repository}\" on {formatted_time}"
        ),
        details: EventDetails::Push { branch },
        author,
        repository,
    })
}

// ---------------------------------------------------------------------------
// pull_request
// ---------------------------------------------------------------------------

/// Normalizes a `pull_request` delivery.
///
/// All required fields are checked before the action is considered, so a
/// malformed payload is reported as such even when its action would be
/// ignored anyway.
///
/// | action | merged | outcome |
/// |--------|--------|---------|
/// | `opened` | any | `pull_request` record |
/// | `closed` | `true` | `merge` record |
/// | `closed` | `false` / absent | skipped |
/// | other | any | skipped |
pub fn normalize_pull_request(payload: &Value, formatted_time: &str) -> Normalized {
    let outcome = extract_pull_request(payload, formatted_time);
    match &outcome {
        Err(reason @ SkipReason::IgnoredAction(_)) => {
            tracing::info!(event_type = "pull_request", %reason, "Ignored pull request action");
        }
        Err(reason) => {
            tracing::error!(
                event_type = "pull_request",
                %reason,
                "Skipping malformed pull request event"
            );
        }
        Ok(_) => {}
    }
    outcome.into()
}

fn extract_pull_request(payload: &Value, formatted_time: &str) -> Result<EventRecord, SkipReason> {
    let payload: PullRequestPayload = parse_payload(payload)?;

    let action = required(payload.action, "action")?;
    let pr = required(payload.pull_request, "pull_request")?;
    let author = required(pr.user.and_then(|u| u.login), "pull_request.user.login")?;
    let from_branch = required(pr.head.and_then(|h| h.git_ref), "pull_request.head.ref")?;
    let base = required(pr.base, "pull_request.base")?;
    let to_branch = required(base.git_ref, "pull_request.base.ref")?;
    let repository = required(
        base.repo.and_then(|r| r.name),
        "pull_request.base.repo.name",
    )?;
    let pr_number = required(pr.number, "pull_request.number")?;
    let merged = pr.merged.unwrap_or(false);

    let (details_action, verb) = match PullRequestAction::parse(&action) {
        Some(PullRequestAction::Opened) => (PullRequestAction::Opened, "submitted"),
        Some(PullRequestAction::Closed) if merged => (PullRequestAction::Closed, "merged"),
        Some(PullRequestAction::Closed) | None => return Err(SkipReason::IgnoredAction(action)),
    };

    let author = AuthorName::new(author);
    let repository = RepositoryName::new(repository);
    let details = PullRequestDetails {
        from_branch: BranchName::new(from_branch),
        to_branch: BranchName::new(to_branch),
        pr_number: PullRequestNumber::new(pr_number),
        action: details_action,
    };

    let message = format!(
        "\"{author}\" {verb} pull request #{number} from \"{from}\" to \"{to}\" in \"{repository}\" on {formatted_time}",
        number = details.pr_number,
        from = details.from_branch,
        to = details.to_branch,
    );

    let details = match details_action {
        PullRequestAction::Opened => EventDetails::PullRequest(details),
        PullRequestAction::Closed => EventDetails::Merge(details),
    };

    Ok(EventRecord {
        details,
        message,
        author,
        repository,
    })
}
