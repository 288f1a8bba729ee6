//! Organization membership records.

use super::client::{ACCEPT_DEFAULT, GitHubClient};
use super::error::GitHubError;
use super::types::{Membership, User};
use crate::sync::{ProgressCallback, PullProgress, emit};

impl GitHubClient {
    pub async fn get_membership(&self, login: &str) -> Result<Membership, GitHubError> {
        let path = format!("/orgs/{}/memberships/{}", self.org(), login);
        self.get(&path, ACCEPT_DEFAULT).await
    }

    /// One membership per user, in the order given.
    pub async fn fetch_memberships(
        &self,
        users: &[User],
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Membership>, GitHubError> {
        let total = users.len();
        emit(
            on_progress,
            PullProgress::FetchingDetails {
                resource: "memberships".to_string(),
                total,
            },
        );

        let mut memberships = Vec::with_capacity(total);
        for (i, user) in users.iter().enumerate() {
            memberships.push(self.get_membership(&user.login).await?);
            emit(
                on_progress,
                PullProgress::FetchedDetail {
                    resource: "memberships".to_string(),
                    name: user.login.clone(),
                    index: i + 1,
                    total,
                },
            );
        }
        Ok(memberships)
    }
}
