//! Remote operations the migration engine needs.

use async_trait::async_trait;

use crate::github::{GitHubClient, GitHubError, InvitationRequest, User};

/// Organization write operations used by [`MigrationEngine`](super::MigrationEngine).
#[async_trait]
pub trait OrgApi: Send + Sync {
    /// Fetch full details for a user.
    async fn get_user(&self, login: &str) -> Result<User, GitHubError>;

    /// Remove a user from the organization.
    async fn remove_member(&self, login: &str) -> Result<(), GitHubError>;

    /// Invite a user to the organization.
    async fn create_invitation(&self, request: &InvitationRequest) -> Result<(), GitHubError>;

    /// Add a user to a team with the given team role.
    async fn set_team_membership(
        &self,
        slug: &str,
        login: &str,
        role: &str,
    ) -> Result<(), GitHubError>;
}

#[async_trait]
impl OrgApi for GitHubClient {
    async fn get_user(&self, login: &str) -> Result<User, GitHubError> {
        GitHubClient::get_user(self, login).await
    }

    async fn remove_member(&self, login: &str) -> Result<(), GitHubError> {
        GitHubClient::remove_member(self, login).await
    }

    async fn create_invitation(&self, request: &InvitationRequest) -> Result<(), GitHubError> {
        GitHubClient::create_invitation(self, request).await
    }

    async fn set_team_membership(
        &self,
        slug: &str,
        login: &str,
        role: &str,
    ) -> Result<(), GitHubError> {
        GitHubClient::set_team_membership(self, slug, login, role).await
    }
}
