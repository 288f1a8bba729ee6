//! Shared fixtures for client tests.

use std::sync::Arc;

use serde_json::Value;

use super::client::GitHubClient;
use crate::config::OrgConfig;
use crate::http::{HttpHeaders, HttpResponse, MockTransport};

pub const API: &str = "https://api.github.test";

pub fn client(transport: &MockTransport) -> GitHubClient {
    let config = OrgConfig::new("acme", "test-token", "/tmp/ghmigrate-test").with_api_url(API);
    GitHubClient::new_with_transport(&config, Arc::new(transport.clone()))
}

/// Rate-limit headers with plenty of quota left.
pub fn rate_headers() -> HttpHeaders {
    vec![
        ("X-RateLimit-Limit".to_string(), "5000".to_string()),
        ("X-RateLimit-Remaining".to_string(), "4999".to_string()),
        ("X-RateLimit-Reset".to_string(), "1000".to_string()),
    ]
}

pub fn response(status: u16, headers: HttpHeaders, body: Vec<u8>) -> HttpResponse {
    HttpResponse {
        status,
        headers,
        body,
    }
}

pub fn json_response(status: u16, body: Value, link: Option<&str>) -> HttpResponse {
    let mut headers = rate_headers();
    if let Some(link) = link {
        headers.push(("Link".to_string(), link.to_string()));
    }
    response(status, headers, body.to_string().into_bytes())
}

/// `Link` header announcing `next` and `last` for `path`.
pub fn link_header(path: &str, next: u32, last: u32) -> String {
    format!(
        "<{API}{path}?per_page=100&page={next}>; rel=\"next\", \
         <{API}{path}?per_page=100&page={last}>; rel=\"last\""
    )
}

pub fn page_url(path: &str, page: u32) -> String {
    format!("{API}{path}?per_page=100&page={page}")
}
