//! Refreshing local snapshots from the organization.
//!
//! - [`progress`] - Progress reporting: `PullProgress`, `ProgressCallback`, `emit()`
//! - [`Puller`] - full or selective pulls into a [`SnapshotStore`]
//!
//! Pulls are fail-fast: the first error aborts, and snapshots saved earlier
//! in the same pull stay on disk.

mod progress;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::info;

use crate::cache::{SnapshotKind, SnapshotStore};
use crate::error::Result;
use crate::github::{GitHubClient, Repository};

pub use progress::{ProgressCallback, PullProgress, emit};

/// What to pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullTarget {
    /// Users, memberships and teams: everything migration reads.
    #[default]
    All,
    Users,
    Memberships,
    Teams,
    Invitations,
    Collaborators,
    Repositories,
}

impl PullTarget {
    pub const NAMES: [&'static str; 7] = [
        "all",
        "users",
        "memberships",
        "teams",
        "invitations",
        "collaborators",
        "repositories",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PullTarget::All => "all",
            PullTarget::Users => "users",
            PullTarget::Memberships => "memberships",
            PullTarget::Teams => "teams",
            PullTarget::Invitations => "invitations",
            PullTarget::Collaborators => "collaborators",
            PullTarget::Repositories => "repositories",
        }
    }
}

impl fmt::Display for PullTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PullTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(PullTarget::All),
            "users" | "members" => Ok(PullTarget::Users),
            "memberships" => Ok(PullTarget::Memberships),
            "teams" => Ok(PullTarget::Teams),
            "invitations" => Ok(PullTarget::Invitations),
            "collaborators" | "outside_collaborators" => Ok(PullTarget::Collaborators),
            "repositories" | "repos" => Ok(PullTarget::Repositories),
            other => Err(format!(
                "unknown pull target '{}' (expected one of: {})",
                other,
                PullTarget::NAMES.join(", ")
            )),
        }
    }
}

/// Snapshots written by one pull, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullSummary {
    pub saved: Vec<(SnapshotKind, usize)>,
}

impl PullSummary {
    fn record(&mut self, kind: SnapshotKind, count: usize) {
        self.saved.push((kind, count));
    }

    pub fn count(&self, kind: SnapshotKind) -> Option<usize> {
        self.saved.iter().find(|(k, _)| *k == kind).map(|(_, c)| *c)
    }
}

/// Fetches organization state and writes it to the snapshot store.
pub struct Puller {
    client: GitHubClient,
    store: SnapshotStore,
    on_progress: Option<ProgressCallback>,
}

impl Puller {
    pub fn new(client: GitHubClient, store: SnapshotStore) -> Self {
        Self {
            client,
            store,
            on_progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    fn progress(&self) -> Option<&ProgressCallback> {
        self.on_progress.as_ref()
    }

    pub async fn pull(&self, target: PullTarget) -> Result<PullSummary> {
        info!(org = self.client.org(), target = %target, "Pulling organization state");
        let mut summary = PullSummary::default();

        match target {
            PullTarget::All => {
                summary.record(SnapshotKind::Users, self.pull_users().await?);
                summary.record(SnapshotKind::Memberships, self.pull_memberships().await?);
                let (teams, repos) = self.pull_teams().await?;
                summary.record(SnapshotKind::Teams, teams);
                summary.record(SnapshotKind::TeamRepos, repos);
            }
            PullTarget::Users => summary.record(SnapshotKind::Users, self.pull_users().await?),
            PullTarget::Memberships => {
                summary.record(SnapshotKind::Memberships, self.pull_memberships().await?)
            }
            PullTarget::Teams => {
                let (teams, repos) = self.pull_teams().await?;
                summary.record(SnapshotKind::Teams, teams);
                summary.record(SnapshotKind::TeamRepos, repos);
            }
            PullTarget::Invitations => {
                summary.record(SnapshotKind::Invitations, self.pull_invitations().await?)
            }
            PullTarget::Collaborators => summary.record(
                SnapshotKind::OutsideCollaborators,
                self.pull_outside_collaborators().await?,
            ),
            PullTarget::Repositories => {
                summary.record(SnapshotKind::Repositories, self.pull_repositories().await?)
            }
        }

        emit(
            self.progress(),
            PullProgress::PullComplete {
                snapshots: summary.saved.len(),
            },
        );
        Ok(summary)
    }

    /// Pull everything migration reads if any of it is missing.
    ///
    /// Returns `None` when all snapshots were already present.
    pub async fn ensure_snapshots(&self) -> Result<Option<PullSummary>> {
        let missing = self.store.missing(&SnapshotKind::MIGRATION);
        if missing.is_empty() {
            return Ok(None);
        }
        info!(missing = ?missing, "Snapshots missing, pulling");
        self.pull(PullTarget::All).await.map(Some)
    }

    /// Make the snapshots `migrate` reads available.
    ///
    /// With `refresh`, users, memberships and teams are pulled again even
    /// when cached, so members who joined since the last pull are found.
    pub async fn prepare_migration(&self, refresh: bool) -> Result<Option<PullSummary>> {
        if refresh {
            info!("Refreshing snapshots before migrating");
            return self.pull(PullTarget::All).await.map(Some);
        }
        self.ensure_snapshots().await
    }

    pub async fn pull_users(&self) -> Result<usize> {
        self.starting(SnapshotKind::Users);
        let users = self.client.fetch_members_detailed(self.progress()).await?;
        self.save(SnapshotKind::Users, &users)
    }

    /// Requires the users snapshot.
    pub async fn pull_memberships(&self) -> Result<usize> {
        self.starting(SnapshotKind::Memberships);
        let users = self.store.load_users()?;
        let memberships = self
            .client
            .fetch_memberships(&users, self.progress())
            .await?;
        self.save(SnapshotKind::Memberships, &memberships)
    }

    /// Writes both the teams and the flattened team repositories.
    /// Requires the users snapshot.
    pub async fn pull_teams(&self) -> Result<(usize, usize)> {
        self.starting(SnapshotKind::Teams);
        let users = self.store.load_users()?;
        let teams = self.client.fetch_teams(&users, self.progress()).await?;

        let team_repos: Vec<Repository> = teams
            .iter()
            .flat_map(|t| t.repositories.iter().cloned())
            .collect();

        let teams_saved = self.save(SnapshotKind::Teams, &teams)?;
        let repos_saved = self.save(SnapshotKind::TeamRepos, &team_repos)?;
        Ok((teams_saved, repos_saved))
    }

    pub async fn pull_invitations(&self) -> Result<usize> {
        self.starting(SnapshotKind::Invitations);
        let invitations = self.client.list_invitations(self.progress()).await?;
        self.save(SnapshotKind::Invitations, &invitations)
    }

    pub async fn pull_outside_collaborators(&self) -> Result<usize> {
        self.starting(SnapshotKind::OutsideCollaborators);
        let collaborators = self
            .client
            .fetch_outside_collaborators(self.progress())
            .await?;
        self.save(SnapshotKind::OutsideCollaborators, &collaborators)
    }

    pub async fn pull_repositories(&self) -> Result<usize> {
        self.starting(SnapshotKind::Repositories);
        let repos = self.client.fetch_org_repositories(self.progress()).await?;
        self.save(SnapshotKind::Repositories, &repos)
    }

    fn starting(&self, kind: SnapshotKind) {
        emit(
            self.progress(),
            PullProgress::PullingKind {
                kind: kind.to_string(),
            },
        );
    }

    fn save<T: Serialize>(&self, kind: SnapshotKind, items: &[T]) -> Result<usize> {
        self.store.save(kind, items)?;
        emit(
            self.progress(),
            PullProgress::SnapshotSaved {
                kind: kind.to_string(),
                count: items.len(),
            },
        );
        Ok(items.len())
    }
}
