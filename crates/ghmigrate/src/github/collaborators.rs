//! Outside collaborators.

use super::client::{ACCEPT_DEFAULT, GitHubClient};
use super::error::GitHubError;
use super::pagination::{Page, walk_pages};
use super::types::User;
use crate::sync::ProgressCallback;

impl GitHubClient {
    pub async fn outside_collaborators_page(&self, page: u32) -> Result<Page<User>, GitHubError> {
        let path = format!("/orgs/{}/outside_collaborators", self.org());
        self.get_page(&path, ACCEPT_DEFAULT, page).await
    }

    pub async fn list_outside_collaborators(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<User>, GitHubError> {
        walk_pages("outside_collaborators", on_progress, |page| {
            self.outside_collaborators_page(page)
        })
        .await
        .into_result("outside_collaborators")
    }

    /// Outside collaborators with full user details.
    pub async fn fetch_outside_collaborators(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<User>, GitHubError> {
        let collaborators = self.list_outside_collaborators(on_progress).await?;
        self.fetch_user_details(&collaborators, "outside_collaborators", on_progress)
            .await
    }
}
