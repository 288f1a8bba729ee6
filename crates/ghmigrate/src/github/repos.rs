//! Organization repositories and their contributors.

use super::client::{ACCEPT_DEFAULT, ACCEPT_REPOS, GitHubClient};
use super::error::GitHubError;
use super::pagination::{Page, walk_pages};
use super::types::{Repository, User};
use crate::sync::{ProgressCallback, PullProgress, emit};

impl GitHubClient {
    pub async fn org_repos_page(&self, page: u32) -> Result<Page<Repository>, GitHubError> {
        let path = format!("/orgs/{}/repos", self.org());
        self.get_page(&path, ACCEPT_REPOS, page).await
    }

    pub async fn list_org_repos(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Repository>, GitHubError> {
        walk_pages("repos", on_progress, |page| self.org_repos_page(page))
            .await
            .into_result("repos")
    }

    /// One page of contributors; an empty repository yields an empty page.
    pub async fn contributors_page(&self, repo: &str, page: u32) -> Result<Page<User>, GitHubError> {
        let path = format!("/repos/{}/{}/contributors", self.org(), repo);
        self.get_page(&path, ACCEPT_DEFAULT, page).await
    }

    pub async fn list_contributors(
        &self,
        repo: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<User>, GitHubError> {
        let resource = format!("repos/{}/contributors", repo);
        walk_pages(&resource, on_progress, |page| self.contributors_page(repo, page))
            .await
            .into_result(&resource)
    }

    /// Every organization repository with its contributor list attached.
    pub async fn fetch_org_repositories(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Repository>, GitHubError> {
        let mut repos = self.list_org_repos(on_progress).await?;
        let total = repos.len();
        emit(
            on_progress,
            PullProgress::FetchingDetails {
                resource: "contributors".to_string(),
                total,
            },
        );

        for (i, repo) in repos.iter_mut().enumerate() {
            repo.contributors = self.list_contributors(&repo.name, on_progress).await?;
            emit(
                on_progress,
                PullProgress::FetchedDetail {
                    resource: "contributors".to_string(),
                    name: repo.name.clone(),
                    index: i + 1,
                    total,
                },
            );
        }
        Ok(repos)
    }
}
