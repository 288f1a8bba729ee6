//! GitHub API error types.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Network or connection failure.
    #[error("HTTP error: {0}")]
    Transport(String),

    /// Non-accepted status; the message is the response body.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not decode into the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `Link` header relation without a parsable page number.
    #[error("Malformed Link header: {header}")]
    LinkHeader { header: String },

    /// Rate limit header missing or non-numeric.
    #[error("Malformed rate limit header {header}: {value:?}")]
    RateLimitHeader {
        header: &'static str,
        value: Option<String>,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<HttpError> for GitHubError {
    fn from(err: HttpError) -> Self {
        GitHubError::Transport(err.to_string())
    }
}

impl GitHubError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &GitHubError) -> String {
    match err {
        GitHubError::Transport(_) => "Network error".to_string(),
        GitHubError::Json(_) => "JSON parse error".to_string(),
        GitHubError::Api { status, message } => {
            if message.len() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        GitHubError::LinkHeader { .. } => "Malformed Link header".to_string(),
        GitHubError::RateLimitHeader { header, .. } => format!("Bad {} header", header),
        GitHubError::Config(msg) => format!("Config: {}", msg),
    }
}
