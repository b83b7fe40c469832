//! Typed views over the inbound GitHub webhook payloads.
//!
//! Only the fields the normalizers read are modelled. Every field is optional:
//! GitHub payloads vary across event actions and API versions, and a missing
//! field must surface as a no-op with the field's path, not as a
//! deserialisation failure. A field present with `null` is treated as missing.
//!
//! Unknown fields are ignored.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Shared fragments
// ---------------------------------------------------------------------------

/// A `repository` object (only its short name is read).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryPayload {
    pub name: Option<String>,
}

/// A `user` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub login: Option<String>,
}

// ---------------------------------------------------------------------------
// push
// ---------------------------------------------------------------------------

/// The `pusher` object of a push payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PusherPayload {
    pub name: Option<String>,
}

/// Body of an `X-GitHub-Event: push` delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    /// Full ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub pusher: Option<PusherPayload>,
    pub repository: Option<RepositoryPayload>,
}

// ---------------------------------------------------------------------------
// pull_request
// ---------------------------------------------------------------------------

/// The `head` object of a pull request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeadPayload {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

/// The `base` object of a pull request. Its `repo` is the target repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BasePayload {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub repo: Option<RepositoryPayload>,
}

/// The `pull_request` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestObject {
    pub number: Option<u64>,
    pub user: Option<UserPayload>,
    pub head: Option<HeadPayload>,
    pub base: Option<BasePayload>,
    /// Absent on most actions; only meaningful for `closed`.
    pub merged: Option<bool>,
}

/// Body of an `X-GitHub-Event: pull_request` delivery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestPayload {
    pub action: Option<String>,
    pub pull_request: Option<PullRequestObject>,
}
