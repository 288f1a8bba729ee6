//! ghmigrate - mirror a GitHub organization locally and migrate memberships.
//!
//! The library pulls users, memberships, teams, invitations, outside
//! collaborators and repositories into JSON snapshots, then uses those
//! snapshots to re-invite or remove a user while keeping their teams.
//!
//! # Example
//!
//! ```ignore
//! use ghmigrate::{GitHubClient, MigrationEngine, OrgConfig, PullTarget, Puller, SnapshotStore};
//!
//! let config = OrgConfig::new("acme", token, "/var/lib/ghmigrate");
//! let client = GitHubClient::new(&config)?;
//! let store = SnapshotStore::new(&config.data_dir);
//!
//! Puller::new(client.clone(), store.clone()).pull(PullTarget::All).await?;
//!
//! let engine = MigrationEngine::new(client, store);
//! let outcome = engine.migrate("octocat").await?;
//! println!("re-invited into {} teams", outcome.team_ids.len());
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod github;
pub mod http;
pub mod migration;
pub mod sync;

pub use cache::{CacheError, SnapshotKind, SnapshotStore};
pub use config::{DEFAULT_API_URL, OrgConfig};
pub use error::{Error, Result, short_error_message};
pub use github::{GitHubClient, GitHubError, UserField};
pub use migration::{MigrationEngine, MigrationOutcome, OrgApi, RemoveOutcome, RestoreSummary};
pub use sync::{ProgressCallback, PullProgress, PullSummary, PullTarget, Puller};
