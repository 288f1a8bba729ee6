//! Organization members and user details.

use tracing::info;

use super::client::{ACCEPT_DEFAULT, GitHubClient};
use super::error::GitHubError;
use super::pagination::{Page, walk_pages};
use super::types::User;
use crate::sync::{ProgressCallback, PullProgress, emit};

impl GitHubClient {
    pub async fn members_page(&self, page: u32) -> Result<Page<User>, GitHubError> {
        let path = format!("/orgs/{}/members", self.org());
        self.get_page(&path, ACCEPT_DEFAULT, page).await
    }

    /// All organization members, as the partial records the list returns.
    pub async fn list_members(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<User>, GitHubError> {
        walk_pages("members", on_progress, |page| self.members_page(page))
            .await
            .into_result("members")
    }

    pub async fn get_user(&self, login: &str) -> Result<User, GitHubError> {
        self.get(&format!("/users/{}", login), ACCEPT_DEFAULT).await
    }

    /// All organization members with full user details.
    pub async fn fetch_members_detailed(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<User>, GitHubError> {
        let members = self.list_members(on_progress).await?;
        self.fetch_user_details(&members, "members", on_progress)
            .await
    }

    /// Replace each partial user with its `GET /users/{login}` record.
    pub(crate) async fn fetch_user_details(
        &self,
        users: &[User],
        resource: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<User>, GitHubError> {
        let total = users.len();
        emit(
            on_progress,
            PullProgress::FetchingDetails {
                resource: resource.to_string(),
                total,
            },
        );

        let mut detailed = Vec::with_capacity(total);
        for (i, user) in users.iter().enumerate() {
            detailed.push(self.get_user(&user.login).await?);
            emit(
                on_progress,
                PullProgress::FetchedDetail {
                    resource: resource.to_string(),
                    name: user.login.clone(),
                    index: i + 1,
                    total,
                },
            );
        }
        Ok(detailed)
    }

    /// Remove a user from the organization.
    pub async fn remove_member(&self, login: &str) -> Result<(), GitHubError> {
        let path = format!("/orgs/{}/members/{}", self.org(), login);
        let status = self.delete(&path).await?;
        info!(login, org = self.org(), status, "Removed organization member");
        Ok(())
    }
}
