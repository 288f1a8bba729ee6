//! GitHub API client creation and request plumbing.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::GitHubError;
use super::pagination::{ListPages, Page, paged, parse_link_header};
use super::rate_limit::RateGovernor;
use crate::config::OrgConfig;
use crate::http::{
    DEFAULT_TIMEOUT, HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
};

pub const ACCEPT_DEFAULT: &str = "application/vnd.github+json";
pub const ACCEPT_INVITATIONS: &str = "application/vnd.github.dazzler-preview+json";
pub const ACCEPT_TEAMS: &str = "application/vnd.github.hellcat-preview+json";
pub const ACCEPT_REPOS: &str = "application/vnd.github.baptiste-preview+json";

const USER_AGENT: &str = "ghmigrate";

/// GitHub API client scoped to one organization.
///
/// Every response is passed through the [`RateGovernor`] before its status
/// is checked, so a nearly exhausted quota pauses the caller even when the
/// request itself failed.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    org: String,
    token: String,
    governor: RateGovernor,
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    pub fn new(config: &OrgConfig) -> Result<Self, GitHubError> {
        if config.org.is_empty() {
            return Err(GitHubError::Config("organization is empty".to_string()));
        }
        let transport = ReqwestTransport::with_timeout(DEFAULT_TIMEOUT)
            .map_err(|e| GitHubError::Config(e.to_string()))?;
        Ok(Self::new_with_transport(config, Arc::new(transport)))
    }

    pub fn new_with_transport(config: &OrgConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            org: config.org.clone(),
            token: config.token.clone(),
            governor: RateGovernor::new(config.rate_limit_floor),
        }
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn governor(&self) -> RateGovernor {
        self.governor
    }

    /// Send one request and run the rate governor over the response.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        accept: &str,
        body: Option<Vec<u8>>,
    ) -> Result<HttpResponse, GitHubError> {
        let url = format!("{}{}", self.api_url, path);

        let mut headers = vec![
            ("Accept".to_string(), accept.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let request = HttpRequest {
            method,
            url,
            headers,
            body: body.unwrap_or_default(),
        };

        let response = self.transport.send(request).await?;
        debug!(
            method = method.as_str(),
            path,
            status = response.status,
            "GitHub API response"
        );

        self.governor.observe(&response.headers).await?;
        Ok(response)
    }

    /// Make an authenticated GET request and decode the body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        accept: &str,
    ) -> Result<T, GitHubError> {
        let response = self.send(HttpMethod::Get, path, accept, None).await?;
        check_status(&response)?;
        serde_json::from_slice(&response.body).map_err(GitHubError::Json)
    }

    /// Fetch one page of a list endpoint along with its `Link` cursor.
    ///
    /// `204 No Content` is an empty final page.
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        accept: &str,
        page: u32,
    ) -> Result<Page<T>, GitHubError> {
        let response = self
            .send(HttpMethod::Get, &paged(path, page), accept, None)
            .await?;

        let pages = match response.header("link") {
            Some(link) => parse_link_header(link)?,
            None => ListPages::default(),
        };
        check_status(&response)?;

        if response.status == 204 {
            return Ok(Page {
                items: Vec::new(),
                pages: ListPages::default(),
            });
        }

        let items = serde_json::from_slice(&response.body).map_err(GitHubError::Json)?;
        Ok(Page { items, pages })
    }

    /// POST a JSON body. The caller decides which statuses are acceptable.
    pub(crate) async fn post_json<B: Serialize>(
        &self,
        path: &str,
        accept: &str,
        body: &B,
    ) -> Result<HttpResponse, GitHubError> {
        let body = serde_json::to_vec(body)?;
        self.send(HttpMethod::Post, path, accept, Some(body)).await
    }

    /// PUT a JSON body, failing on any non-2xx status.
    pub(crate) async fn put_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<u16, GitHubError> {
        let body = serde_json::to_vec(body)?;
        let response = self
            .send(HttpMethod::Put, path, ACCEPT_DEFAULT, Some(body))
            .await?;
        check_status(&response)?;
        Ok(response.status)
    }

    /// Make an authenticated DELETE request.
    pub(crate) async fn delete(&self, path: &str) -> Result<u16, GitHubError> {
        let response = self
            .send(HttpMethod::Delete, path, ACCEPT_DEFAULT, None)
            .await?;
        check_status(&response)?;
        Ok(response.status)
    }
}

/// Any non-2xx status becomes an API error carrying the body.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), GitHubError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(GitHubError::Api {
        status: response.status,
        message: response.body_text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::test_support::{API, client, json_response, rate_headers, response};
    use crate::github::types::User;
    use crate::http::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn get_sends_auth_accept_and_user_agent() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/users/octocat"),
            json_response(200, json!({"login": "octocat", "id": 1}), None),
        );
        let client = client(&transport);

        let user: User = client.get("/users/octocat", ACCEPT_DEFAULT).await.unwrap();
        assert_eq!(user.login, "octocat");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.header("authorization"), Some("Bearer test-token"));
        assert_eq!(req.header("accept"), Some(ACCEPT_DEFAULT));
        assert_eq!(req.header("user-agent"), Some("ghmigrate"));
        assert_eq!(req.header("content-type"), None);
    }

    #[tokio::test]
    async fn non_success_status_is_api_error_with_body() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/users/ghost"),
            response(404, rate_headers(), br#"{"message":"Not Found"}"#.to_vec()),
        );
        let client = client(&transport);

        let err = client
            .get::<User>("/users/ghost", ACCEPT_DEFAULT)
            .await
            .unwrap_err();
        match err {
            GitHubError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("Not Found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_rate_headers_fail_the_call() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/users/octocat"),
            response(200, Vec::new(), br#"{"login":"octocat"}"#.to_vec()),
        );
        let client = client(&transport);

        let err = client
            .get::<User>("/users/octocat", ACCEPT_DEFAULT)
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::RateLimitHeader { .. }));
    }

    #[tokio::test]
    async fn get_page_parses_link_cursor() {
        let transport = MockTransport::new();
        let link = format!(
            "<{API}/orgs/acme/members?per_page=100&page=2>; rel=\"next\", \
             <{API}/orgs/acme/members?per_page=100&page=4>; rel=\"last\""
        );
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/orgs/acme/members?per_page=100&page=1"),
            json_response(200, json!([{"login": "a"}, {"login": "b"}]), Some(&link)),
        );
        let client = client(&transport);

        let page: Page<User> = client
            .get_page("/orgs/acme/members", ACCEPT_DEFAULT, 1)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pages.next, 2);
        assert_eq!(page.pages.last, 4);
    }

    #[tokio::test]
    async fn get_page_rejects_malformed_link() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/orgs/acme/members?per_page=100&page=1"),
            json_response(
                200,
                json!([]),
                Some(&format!("<{API}/orgs/acme/members>; rel=\"next\"")),
            ),
        );
        let client = client(&transport);

        let err = client
            .get_page::<User>("/orgs/acme/members", ACCEPT_DEFAULT, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::LinkHeader { .. }));
    }

    #[tokio::test]
    async fn get_page_treats_no_content_as_empty() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Get,
            format!("{API}/repos/acme/empty/contributors?per_page=100&page=1"),
            response(204, rate_headers(), Vec::new()),
        );
        let client = client(&transport);

        let page: Page<User> = client
            .get_page("/repos/acme/empty/contributors", ACCEPT_DEFAULT, 1)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.pages, ListPages::default());
    }

    #[tokio::test]
    async fn put_json_sends_body_and_content_type() {
        let transport = MockTransport::new();
        transport.push_response(
            HttpMethod::Put,
            format!("{API}/orgs/acme/teams/core/memberships/octocat"),
            json_response(200, json!({"state": "active"}), None),
        );
        let client = client(&transport);

        let status = client
            .put_json(
                "/orgs/acme/teams/core/memberships/octocat",
                &json!({"role": "member"}),
            )
            .await
            .unwrap();
        assert_eq!(status, 200);

        let req = &transport.requests_with(HttpMethod::Put)[0];
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
        assert_eq!(body, json!({"role": "member"}));
    }

    #[test]
    fn new_rejects_empty_org() {
        let config = OrgConfig::new("", "token", "/tmp");
        assert!(matches!(
            GitHubClient::new(&config),
            Err(GitHubError::Config(_))
        ));
    }

    #[test]
    fn new_with_transport_trims_api_url() {
        let transport = MockTransport::new();
        let config = OrgConfig::new("acme", "t", "/tmp")
            .with_rate_limit_floor(10)
            .with_api_url("https://ghe.example/api/v3/");
        let client = GitHubClient::new_with_transport(&config, Arc::new(transport));
        assert_eq!(client.api_url(), "https://ghe.example/api/v3");
        assert_eq!(client.org(), "acme");
        assert_eq!(client.governor().floor(), 10);
    }
}
