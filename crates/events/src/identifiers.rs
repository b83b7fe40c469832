//! Newtype domain identifiers.
//!
//! Every value extracted from a webhook payload that names something (an actor,
//! a branch, a repository, a pull request) is wrapped in a distinct newtype.
//! This prevents accidentally passing, for example, a [`BranchName`] where a
//! [`RepositoryName`] is expected even though both are strings under the hood.
//!
//! All newtypes serialise transparently as their inner value, so stored
//! documents contain plain strings and integers.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new(), as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wraps the given value.
            ///
            /// Empty strings are accepted: webhook payloads are stored as
            /// delivered and an empty value is still a present value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

/// Identifies a GitHub Pull Request by its repository-scoped number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// The identity of the actor behind an event.
    ///
    /// For pushes this is `pusher.name`; for pull requests it is the pull
    /// request author's `user.login`.
    AuthorName
}

string_id! {
    /// A short Git branch name (e.g. `"main"`), never a full ref path.
    BranchName
}

string_id! {
    /// A repository name without its owner (e.g. `"hookstream"`).
    RepositoryName
}

impl BranchName {
    /// Derives a branch name from a ref path by taking its final `/`-separated
    /// segment.
    ///
    /// `refs/heads/main` yields `main`; `refs/heads/feature/login` yields
    /// `login`. A ref without any `/` is returned unchanged.
    pub fn from_ref(git_ref: &str) -> Self {
        let last = git_ref.rsplit('/').next().unwrap_or(git_ref);
        Self::new(last)
    }
}
