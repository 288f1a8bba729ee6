//! Teams, their members and their repositories.

use serde_json::json;
use tracing::{debug, info};

use super::client::{ACCEPT_DEFAULT, ACCEPT_TEAMS, GitHubClient};
use super::error::GitHubError;
use super::pagination::{Page, walk_pages};
use super::types::{Repository, Team, User};
use crate::cache::find_user_by_id;
use crate::sync::{ProgressCallback, PullProgress, emit};

/// Swap each partial member record for the matching detailed user.
///
/// Members are matched by id; a member missing from `users` keeps its
/// partial record.
pub fn resolve_members(partial: Vec<User>, users: &[User]) -> Vec<User> {
    partial
        .into_iter()
        .map(|member| {
            find_user_by_id(users, member.id)
                .cloned()
                .unwrap_or(member)
        })
        .collect()
}

impl GitHubClient {
    pub async fn teams_page(&self, page: u32) -> Result<Page<Team>, GitHubError> {
        let path = format!("/orgs/{}/teams", self.org());
        self.get_page(&path, ACCEPT_TEAMS, page).await
    }

    pub async fn list_teams(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Team>, GitHubError> {
        walk_pages("teams", on_progress, |page| self.teams_page(page))
            .await
            .into_result("teams")
    }

    pub async fn get_team(&self, slug: &str) -> Result<Team, GitHubError> {
        let path = format!("/orgs/{}/teams/{}", self.org(), slug);
        self.get(&path, ACCEPT_DEFAULT).await
    }

    pub async fn team_members_page(&self, slug: &str, page: u32) -> Result<Page<User>, GitHubError> {
        let path = format!("/orgs/{}/teams/{}/members", self.org(), slug);
        self.get_page(&path, ACCEPT_DEFAULT, page).await
    }

    pub async fn list_team_members(
        &self,
        slug: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<User>, GitHubError> {
        let resource = format!("teams/{}/members", slug);
        walk_pages(&resource, on_progress, |page| self.team_members_page(slug, page))
            .await
            .into_result(&resource)
    }

    pub async fn team_repos_page(
        &self,
        slug: &str,
        page: u32,
    ) -> Result<Page<Repository>, GitHubError> {
        let path = format!("/orgs/{}/teams/{}/repos", self.org(), slug);
        self.get_page(&path, ACCEPT_TEAMS, page).await
    }

    /// All repositories of `team`, each stamped with the owning team.
    pub async fn list_team_repos(
        &self,
        team: &Team,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Repository>, GitHubError> {
        let resource = format!("teams/{}/repos", team.slug);
        let mut repos = walk_pages(&resource, on_progress, |page| {
            self.team_repos_page(&team.slug, page)
        })
        .await
        .into_result(&resource)?;

        let owner = team.summary();
        for repo in &mut repos {
            repo.team = Some(owner.clone());
        }
        Ok(repos)
    }

    /// Add or update a user's membership in a team.
    pub async fn set_team_membership(
        &self,
        slug: &str,
        login: &str,
        role: &str,
    ) -> Result<(), GitHubError> {
        let path = format!("/orgs/{}/teams/{}/memberships/{}", self.org(), slug, login);
        self.put_json(&path, &json!({ "role": role })).await?;
        info!(team = slug, login, role, "Set team membership");
        Ok(())
    }

    /// Every team with full detail, repositories and resolved members.
    ///
    /// `users` is the detailed user list members are resolved against.
    pub async fn fetch_teams(
        &self,
        users: &[User],
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Team>, GitHubError> {
        let listed = self.list_teams(on_progress).await?;
        let total = listed.len();
        emit(
            on_progress,
            PullProgress::FetchingDetails {
                resource: "teams".to_string(),
                total,
            },
        );

        let mut teams = Vec::with_capacity(total);
        for (i, summary) in listed.iter().enumerate() {
            let mut team = self.get_team(&summary.slug).await?;
            let members = self.list_team_members(&team.slug, on_progress).await?;
            team.members = resolve_members(members, users);
            team.repositories = self.list_team_repos(&team, on_progress).await?;
            debug!(
                team = %team.slug,
                members = team.members.len(),
                repos = team.repositories.len(),
                "Fetched team"
            );

            emit(
                on_progress,
                PullProgress::FetchedDetail {
                    resource: "teams".to_string(),
                    name: team.slug.clone(),
                    index: i + 1,
                    total,
                },
            );
            teams.push(team);
        }
        Ok(teams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::test_support::{
        API, client, json_response, link_header, page_url, rate_headers, response,
    };
    use crate::http::{HttpMethod, MockTransport};

    fn user(login: &str, id: u64) -> User {
        User {
            login: login.to_string(),
            id,
            ..Default::default()
        }
    }

    #[test]
    fn resolve_members_matches_by_id_and_keeps_unknowns() {
        let detailed = vec![User {
            name: Some("Alice".to_string()),
            ..user("alice", 1)
        }];
        let resolved = resolve_members(vec![user("alice", 1), user("bob", 2)], &detailed);

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name.as_deref(), Some("Alice"));
        assert_eq!(resolved[1], user("bob", 2));
    }

    #[tokio::test]
    async fn fetch_teams_fills_members_and_stamped_repos() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            page_url("/orgs/acme/teams", 1),
            json_response(200, json!([{"id": 10, "slug": "core", "name": "Core"}]), None),
        );
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/orgs/acme/teams/core"),
            json_response(
                200,
                json!({"id": 10, "slug": "core", "name": "Core", "members_count": 2,
                       "organization": {"login": "acme"}}),
                None,
            ),
        );
        let members_path = "/orgs/acme/teams/core/members";
        transport.push_response(
            HttpMethod::Get,
            page_url(members_path, 1),
            json_response(
                200,
                json!([{"login": "alice", "id": 1}]),
                Some(&link_header(members_path, 2, 2)),
            ),
        );
        transport.push_response(
            HttpMethod::Get,
            page_url(members_path, 2),
            json_response(200, json!([{"login": "bob", "id": 2}]), None),
        );
        transport.push_response(
            HttpMethod::Get,
            page_url("/orgs/acme/teams/core/repos", 1),
            json_response(200, json!([{"id": 100, "name": "widgets"}]), None),
        );
        let client = client(&transport);
        let users = vec![User {
            email: Some("alice@example.com".to_string()),
            ..user("alice", 1)
        }];

        let teams = client.fetch_teams(&users, None).await.unwrap();

        assert_eq!(teams.len(), 1);
        let team = &teams[0];
        assert_eq!(team.members_count, 2);
        assert_eq!(team.members.len(), 2);
        assert_eq!(team.members[0].email(), Some("alice@example.com"));
        assert_eq!(team.members[1].login, "bob");
        assert_eq!(team.repositories.len(), 1);
        let owner = team.repositories[0].team.as_ref().unwrap();
        assert_eq!(owner.slug, "core");
        assert_eq!(owner.id, 10);

        let accepts: Vec<_> = transport
            .requests()
            .iter()
            .filter(|r| r.url.contains("/repos?") || r.url.ends_with("/teams?per_page=100&page=1"))
            .map(|r| r.header("accept").unwrap_or_default().to_string())
            .collect();
        assert!(accepts.iter().all(|a| a == ACCEPT_TEAMS));
    }

    #[tokio::test]
    async fn fetch_teams_aborts_on_nested_failure() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            page_url("/orgs/acme/teams", 1),
            json_response(200, json!([{"id": 10, "slug": "core"}]), None),
        );
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/orgs/acme/teams/core"),
            response(403, rate_headers(), b"forbidden".to_vec()),
        );
        let client = client(&transport);

        let err = client.fetch_teams(&[], None).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn set_team_membership_puts_role() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Put,
            format!("{API}/orgs/acme/teams/core/memberships/alice"),
            json_response(200, json!({"role": "maintainer", "state": "active"}), None),
        );
        let client = client(&transport);

        client
            .set_team_membership("core", "alice", "maintainer")
            .await
            .unwrap();

        let sent = &transport.requests_with(HttpMethod::Put)[0];
        let body: serde_json::Value = serde_json::from_slice(&sent.body).unwrap();
        assert_eq!(body, json!({"role": "maintainer"}));
    }
}
