//! Explicit configuration shared by every component.
//!
//! There is no process-wide state: the CLI resolves flags, environment and
//! config files into one [`OrgConfig`] and hands it to the client, the
//! snapshot store and the migration engine at construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::github::DEFAULT_RATE_LIMIT_FLOOR;

/// Public GitHub API root.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Organization, credentials and local data directory for one run.
#[derive(Clone)]
pub struct OrgConfig {
    /// Organization every entity kind is fetched relative to.
    pub org: String,
    /// Bearer token with admin access to the organization.
    pub token: String,
    /// API root, without a trailing slash.
    pub api_url: String,
    /// Directory holding the JSON snapshots.
    pub data_dir: PathBuf,
    /// Remaining-quota threshold at or below which the rate governor pauses.
    pub rate_limit_floor: u64,
    /// Maximum age of the teams snapshot accepted by the migration engine.
    pub max_snapshot_age: Option<Duration>,
}

impl OrgConfig {
    pub fn new(org: impl Into<String>, token: impl Into<String>, data_dir: impl AsRef<Path>) -> Self {
        Self {
            org: org.into(),
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: data_dir.as_ref().to_path_buf(),
            rate_limit_floor: DEFAULT_RATE_LIMIT_FLOOR,
            max_snapshot_age: None,
        }
    }

    /// Point the client at another API root (e.g. GitHub Enterprise).
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl AsRef<str>) -> Self {
        self.api_url = api_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_rate_limit_floor(mut self, floor: u64) -> Self {
        self.rate_limit_floor = floor;
        self
    }

    #[must_use]
    pub fn with_max_snapshot_age(mut self, age: Option<Duration>) -> Self {
        self.max_snapshot_age = age;
        self
    }
}

impl fmt::Debug for OrgConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrgConfig")
            .field("org", &self.org)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("data_dir", &self.data_dir)
            .field("rate_limit_floor", &self.rate_limit_floor)
            .field("max_snapshot_age", &self.max_snapshot_age)
            .finish()
    }
}
