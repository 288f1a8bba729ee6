//! Configuration file support for ghmigrate.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables prefixed with `GHMIGRATE_` (e.g. `GHMIGRATE_GITHUB_TOKEN`)
//! 3. Legacy environment variables `GITHUB_ORG`, `GITHUB_TOKEN`, `DATA_DIR`
//! 4. Config file (./ghmigrate.toml, then ~/.config/ghmigrate/config.toml)
//! 5. Built-in defaults
//!
//! Snapshots default to `~/.local/state/ghmigrate/<org>` on Linux (using the
//! XDG state directory) if no directory is configured.
//!
//! Example config file:
//! ```toml
//! [github]
//! org = "acme"
//! token = "ghp_..."                     # or GHMIGRATE_GITHUB_TOKEN
//! host = "https://ghe.example/api/v3"   # optional, defaults to api.github.com
//!
//! [cache]
//! dir = "/var/lib/ghmigrate/acme"       # or GHMIGRATE_CACHE_DIR
//! ttl = 86400                           # max teams snapshot age (seconds) for migrate
//!
//! [ratelimit]
//! floor = 50
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use ghmigrate::OrgConfig;
use serde::Deserialize;

const ENV_PREFIX: &str = "GHMIGRATE";

/// Legacy variable names and the `GHMIGRATE_` names they stand in for.
const LEGACY_ENV: [(&str, &str); 3] = [
    ("GITHUB_ORG", "GHMIGRATE_GITHUB_ORG"),
    ("GITHUB_TOKEN", "GHMIGRATE_GITHUB_TOKEN"),
    ("DATA_DIR", "GHMIGRATE_CACHE_DIR"),
];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub cache: CacheConfig,
    pub ratelimit: RateLimitConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Organization to operate on.
    pub org: Option<String>,
    /// API token with organization admin rights.
    pub token: Option<String>,
    /// API root URL, for GitHub Enterprise.
    pub host: Option<String>,
}

/// Snapshot cache configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot directory.
    pub dir: Option<PathBuf>,
    /// Maximum age in seconds of the teams snapshot accepted by `migrate`.
    pub ttl: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Remaining-quota threshold at which requests pause until reset.
    pub floor: Option<u64>,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub org: Option<String>,
    pub token: Option<String>,
    pub dir: Option<PathBuf>,
    pub api_url: Option<String>,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Falls back to defaults (with a warning) if the sources do not parse.
    pub fn load() -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        match Self::build(&Self::config_files(), &env) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}", e);
                Config::default()
            }
        }
    }

    /// Config files that exist, lowest priority first.
    fn config_files() -> Vec<PathBuf> {
        let mut files = Vec::new();
        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            files.push(path);
        }
        let local = PathBuf::from("ghmigrate.toml");
        if local.exists() {
            tracing::debug!("Loading config from ./ghmigrate.toml");
            files.push(local);
        }
        files
    }

    /// Layer `files` and the given environment.
    fn build(files: &[PathBuf], env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        for file in files {
            builder = builder.add_source(
                File::from(file.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // Legacy names are re-keyed under the prefix so they parse the same
        // way, then layered below the real GHMIGRATE_ variables.
        let legacy: HashMap<String, String> = LEGACY_ENV
            .iter()
            .filter_map(|(old, new)| env.get(*old).map(|v| (new.to_string(), v.clone())))
            .collect();
        builder = builder.add_source(Self::environment().source(Some(legacy)));

        let prefixed: HashMap<String, String> = env
            .iter()
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        builder = builder.add_source(Self::environment().source(Some(prefixed)));

        builder.build()?.try_deserialize()
    }

    /// `GHMIGRATE_GITHUB_ORG` -> `github.org`, `GHMIGRATE_CACHE_DIR` -> `cache.dir`.
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("_")
            .try_parsing(true)
    }

    /// Merge with command-line overrides into the library configuration.
    ///
    /// Fails when no organization or token is available from any source.
    pub fn resolve(&self, overrides: &Overrides) -> Result<OrgConfig, String> {
        let org = overrides
            .org
            .clone()
            .or_else(|| self.github.org.clone())
            .filter(|o| !o.is_empty())
            .ok_or("No organization configured. Pass --org or set GHMIGRATE_GITHUB_ORG (or GITHUB_ORG).")?;

        let token = overrides
            .token
            .clone()
            .or_else(|| self.github.token.clone())
            .filter(|t| !t.is_empty())
            .ok_or("No GitHub token configured. Pass --token or set GHMIGRATE_GITHUB_TOKEN (or GITHUB_TOKEN).")?;

        let data_dir = overrides
            .dir
            .clone()
            .or_else(|| self.cache.dir.clone())
            .or_else(|| Self::default_state_dir().map(|dir| dir.join(&org)))
            .ok_or("Could not determine a snapshot directory. Pass --dir or set GHMIGRATE_CACHE_DIR.")?;

        let mut config = OrgConfig::new(org, token, data_dir)
            .with_max_snapshot_age(self.cache.ttl.map(Duration::from_secs));
        if let Some(api_url) = overrides.api_url.as_ref().or(self.github.host.as_ref()) {
            config = config.with_api_url(api_url);
        }
        if let Some(floor) = self.ratelimit.floor {
            config = config.with_rate_limit_floor(floor);
        }
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ghmigrate").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/ghmigrate` or `~/.local/state/ghmigrate`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ghmigrate").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
