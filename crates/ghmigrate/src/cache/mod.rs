//! File-backed snapshots of organization state.
//!
//! One JSON array per entity kind under a single directory. A save replaces
//! the whole file (temp file, fsync, rename), so readers only ever see a
//! complete prior snapshot or the new one.

mod lookup;

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::github::{Membership, Team, User};

pub use lookup::{find_membership, find_user_by_id, team_ids_for};

/// The entity kinds persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Users,
    Teams,
    Memberships,
    Invitations,
    OutsideCollaborators,
    Repositories,
    TeamRepos,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 7] = [
        SnapshotKind::Users,
        SnapshotKind::Teams,
        SnapshotKind::Memberships,
        SnapshotKind::Invitations,
        SnapshotKind::OutsideCollaborators,
        SnapshotKind::Repositories,
        SnapshotKind::TeamRepos,
    ];

    /// Snapshots the migration engine reads.
    pub const MIGRATION: [SnapshotKind; 3] = [
        SnapshotKind::Users,
        SnapshotKind::Memberships,
        SnapshotKind::Teams,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SnapshotKind::Users => "users.json",
            SnapshotKind::Teams => "teams.json",
            SnapshotKind::Memberships => "memberships.json",
            SnapshotKind::Invitations => "invitations.json",
            SnapshotKind::OutsideCollaborators => "outside_collaborators.json",
            SnapshotKind::Repositories => "repositories.json",
            SnapshotKind::TeamRepos => "teamrepos.json",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Errors from snapshot I/O.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No snapshot has been saved for this kind yet.
    #[error("No {kind} snapshot at {path}; pull it first")]
    NotFound { kind: SnapshotKind, path: PathBuf },

    /// Snapshot exists but does not decode.
    #[error("Snapshot corrupted at {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Directory of JSON snapshots, one file per [`SnapshotKind`].
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: SnapshotKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))
    }

    /// Replace the snapshot for `kind` with `items`.
    pub fn save<T: Serialize>(&self, kind: SnapshotKind, items: &[T]) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let target = self.path(kind);
        let temp_path = self.dir.join(format!(".{}.tmp", kind.file_name()));
        let json = serde_json::to_vec_pretty(items)?;

        let written = Self::write_synced(&temp_path, &json)
            .map_err(|e| CacheError::io(&temp_path, e))
            .and_then(|()| {
                std::fs::rename(&temp_path, &target).map_err(|e| CacheError::io(&target, e))
            });
        if let Err(e) = written {
            // The previous snapshot, if any, is untouched.
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }

        info!(path = %target.display(), count = items.len(), "Saved snapshot");
        Ok(())
    }

    fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }

    /// Load the snapshot for `kind`.
    ///
    /// A kind that was never saved is [`CacheError::NotFound`]; an empty
    /// array is a valid snapshot.
    pub fn load<T: DeserializeOwned>(&self, kind: SnapshotKind) -> Result<Vec<T>, CacheError> {
        let path = self.path(kind);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound { kind, path });
            }
            Err(e) => return Err(CacheError::io(&path, e)),
        };

        let items: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupted {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), count = items.len(), "Loaded snapshot");
        Ok(items)
    }

    pub fn exists(&self, kind: SnapshotKind) -> bool {
        self.path(kind).is_file()
    }

    /// The kinds among `kinds` that have no snapshot yet.
    pub fn missing(&self, kinds: &[SnapshotKind]) -> Vec<SnapshotKind> {
        kinds.iter().copied().filter(|k| !self.exists(*k)).collect()
    }

    /// When the snapshot for `kind` was last written.
    pub fn modified_at(&self, kind: SnapshotKind) -> Result<DateTime<Utc>, CacheError> {
        Ok(DateTime::<Utc>::from(self.modified(kind)?))
    }

    /// Time since the snapshot for `kind` was last written.
    pub fn age(&self, kind: SnapshotKind) -> Result<Duration, CacheError> {
        let modified = self.modified(kind)?;
        Ok(SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO))
    }

    fn modified(&self, kind: SnapshotKind) -> Result<SystemTime, CacheError> {
        let path = self.path(kind);
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::NotFound { kind, path });
            }
            Err(e) => return Err(CacheError::io(&path, e)),
        };
        metadata.modified().map_err(|e| CacheError::io(&path, e))
    }

    pub fn load_users(&self) -> Result<Vec<User>, CacheError> {
        self.load(SnapshotKind::Users)
    }

    pub fn load_teams(&self) -> Result<Vec<Team>, CacheError> {
        self.load(SnapshotKind::Teams)
    }

    pub fn load_memberships(&self) -> Result<Vec<Membership>, CacheError> {
        self.load(SnapshotKind::Memberships)
    }

    /// Cached membership for `login`, or the empty sentinel when absent.
    pub fn membership_for(&self, login: &str) -> Result<Membership, CacheError> {
        Ok(find_membership(&self.load_memberships()?, login))
    }

    /// Ids of cached teams whose member list contains `user`.
    pub fn team_ids_for(&self, user: &User) -> Result<Vec<u64>, CacheError> {
        Ok(team_ids_for(&self.load_teams()?, user))
    }

    /// Members of the cached team with the given slug.
    pub fn team_members(&self, slug: &str) -> Result<Option<Vec<User>>, CacheError> {
        Ok(self
            .load_teams()?
            .into_iter()
            .find(|t| t.slug.eq_ignore_ascii_case(slug))
            .map(|t| t.members))
    }
}
