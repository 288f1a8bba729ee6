//! Crate-level error type for pull and migration workflows.

use std::time::Duration;

use thiserror::Error;

use crate::cache::{CacheError, SnapshotKind};
use crate::github::{self, GitHubError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A snapshot the migration relies on is older than allowed.
    #[error("{kind} is {}s old (max {}s); pull it again before migrating", .age.as_secs(), .max_age.as_secs())]
    StaleSnapshot {
        kind: SnapshotKind,
        age: Duration,
        max_age: Duration,
    },

    /// The user was removed from the organization but the re-invite failed.
    #[error("{login} was removed but could not be re-invited (teams to restore: {team_ids:?}): {source}")]
    InviteAfterRemove {
        login: String,
        team_ids: Vec<u64>,
        #[source]
        source: GitHubError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Get a short error message suitable for display.
pub fn short_error_message(err: &Error) -> String {
    match err {
        Error::GitHub(e) => github::short_error_message(e),
        Error::Cache(CacheError::NotFound { kind, .. }) => format!("Missing {}", kind),
        Error::Cache(CacheError::Corrupted { path, .. }) => {
            format!("Corrupted {}", path.display())
        }
        Error::Cache(_) => "Snapshot I/O error".to_string(),
        Error::StaleSnapshot { kind, .. } => format!("Stale {}", kind),
        Error::InviteAfterRemove { login, .. } => format!("Re-invite of {} failed", login),
    }
}
