//! Membership migration: re-invite or remove one user while keeping the
//! teams they belong to.
//!
//! The engine reads memberships and teams from the snapshot store and only
//! talks to the organization through [`OrgApi`]. Team ids come from the
//! cached teams, so that snapshot must be fresh before migrating; see
//! [`MigrationEngine::check_preconditions`].

mod api;

use std::time::Duration;

use tracing::{error, info, warn};

use crate::cache::{SnapshotKind, SnapshotStore, find_membership};
use crate::error::{Error, Result};
use crate::github::{InvitationRequest, Invitee, MemberState, Membership};

pub use api::OrgApi;

/// Result of [`MigrationEngine::migrate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub login: String,
    pub previous_state: MemberState,
    /// Whether an existing membership was deleted first.
    pub removed: bool,
    pub invitee: Invitee,
    /// Role sent on the wire.
    pub role: String,
    pub team_ids: Vec<u64>,
}

/// Result of [`MigrationEngine::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed { previous_state: MemberState },
    NotAMember,
}

/// Result of [`MigrationEngine::restore_team_memberships`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub teams: usize,
    pub memberships: usize,
}

/// Team role for a cached member given their organization role.
pub fn team_role_for(org_role: &str) -> &'static str {
    if org_role == "admin" {
        "maintainer"
    } else {
        "member"
    }
}

pub struct MigrationEngine<A: OrgApi> {
    api: A,
    store: SnapshotStore,
    max_snapshot_age: Option<Duration>,
}

impl<A: OrgApi> MigrationEngine<A> {
    pub fn new(api: A, store: SnapshotStore) -> Self {
        Self {
            api,
            store,
            max_snapshot_age: None,
        }
    }

    /// Reject a teams snapshot older than `max_age`.
    #[must_use]
    pub fn with_max_snapshot_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_snapshot_age = max_age;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Memberships and teams must be cached, and teams young enough.
    pub fn check_preconditions(&self) -> Result<()> {
        for kind in [SnapshotKind::Memberships, SnapshotKind::Teams] {
            if !self.store.exists(kind) {
                return Err(crate::cache::CacheError::NotFound {
                    kind,
                    path: self.store.path(kind),
                }
                .into());
            }
        }

        if let Some(max_age) = self.max_snapshot_age {
            let age = self.store.age(SnapshotKind::Teams)?;
            if age > max_age {
                return Err(Error::StaleSnapshot {
                    kind: SnapshotKind::Teams,
                    age,
                    max_age,
                });
            }
        }
        Ok(())
    }

    /// Re-invite `login`, carrying over their role and cached teams.
    ///
    /// An existing membership is deleted first. Without one, the user's
    /// details are fetched so the invite can address them by id.
    pub async fn migrate(&self, login: &str) -> Result<MigrationOutcome> {
        self.check_preconditions()?;

        let mut membership = self.store.membership_for(login)?;
        let previous_state = membership.member_state();
        let login = canonical_login(&membership, login);

        let removed = if membership.exists() {
            info!(login = %login, state = %previous_state, "Removing existing membership");
            self.api.remove_member(&login).await?;
            true
        } else {
            info!(login = %login, "No cached membership, fetching user details");
            membership.user = self.api.get_user(&login).await?;
            false
        };

        let team_ids = self.store.team_ids_for(&membership.user)?;
        let invitee = Invitee::for_user(&membership.user);
        let request = InvitationRequest::new(&invitee, &membership.role, team_ids.clone());

        if let Err(source) = self.api.create_invitation(&request).await {
            if removed {
                error!(
                    login = %login,
                    team_ids = ?team_ids,
                    error = %source,
                    "User was removed but the invitation failed; re-add them manually"
                );
                return Err(Error::InviteAfterRemove {
                    login,
                    team_ids,
                    source,
                });
            }
            return Err(source.into());
        }

        info!(
            login = %login,
            invitee = %invitee,
            role = %request.role,
            teams = team_ids.len(),
            "Invited user"
        );

        Ok(MigrationOutcome {
            login,
            previous_state,
            removed,
            invitee,
            role: request.role,
            team_ids,
        })
    }

    /// Remove `login` from the organization if a membership is cached.
    pub async fn remove(&self, login: &str) -> Result<RemoveOutcome> {
        let membership = self.store.membership_for(login)?;
        let previous_state = membership.member_state();

        if !membership.exists() {
            warn!(login, "No cached membership, nothing to remove");
            return Ok(RemoveOutcome::NotAMember);
        }

        let login = canonical_login(&membership, login);
        self.api.remove_member(&login).await?;
        info!(login = %login, state = %previous_state, "Removed user");
        Ok(RemoveOutcome::Removed { previous_state })
    }

    /// Re-add every cached team member to their team.
    ///
    /// Organization admins become team maintainers. Stops at the first
    /// failure.
    pub async fn restore_team_memberships(&self) -> Result<RestoreSummary> {
        let teams = self.store.load_teams()?;
        let memberships = self.store.load_memberships()?;
        let mut summary = RestoreSummary::default();

        for team in &teams {
            for member in &team.members {
                let org_role = find_membership(&memberships, &member.login).role;
                let role = team_role_for(&org_role);
                self.api
                    .set_team_membership(&team.slug, &member.login, role)
                    .await?;
                summary.memberships += 1;
            }
            summary.teams += 1;
            info!(team = %team.slug, members = team.members.len(), "Restored team memberships");
        }
        Ok(summary)
    }
}

fn canonical_login(membership: &Membership, login: &str) -> String {
    if membership.user.login.is_empty() {
        login.to_string()
    } else {
        membership.user.login.clone()
    }
}
