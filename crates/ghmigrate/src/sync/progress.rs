//! Progress reporting types for pull operations.
//!
//! Pagination walks, detail fan-outs and snapshot saves all report through
//! the same optional callback so the CLI can render them as log lines.

/// Progress events emitted while pulling organization state.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum PullProgress {
    /// Starting to pull one snapshot kind.
    PullingKind {
        /// Snapshot file name (e.g. `users.json`).
        kind: String,
    },

    /// Fetched one page of a paginated resource.
    FetchedPage {
        /// Resource being walked (e.g. `members`, `teams/core/members`).
        resource: String,
        /// Page number (1-indexed).
        page: u32,
        /// Number of items on this page.
        count: usize,
        /// Running total of items fetched so far.
        total_so_far: usize,
        /// Last page announced by the `Link` header, if any.
        last_page: Option<u32>,
    },

    /// Starting a per-item detail fan-out.
    FetchingDetails {
        /// What the details are fetched for.
        resource: String,
        /// Number of items to fetch.
        total: usize,
    },

    /// Fetched the detail record for one item.
    FetchedDetail {
        /// What the details are fetched for.
        resource: String,
        /// Item identifier (login, team slug, repository name).
        name: String,
        /// Position of the item (1-indexed).
        index: usize,
        /// Number of items in the fan-out.
        total: usize,
    },

    /// A snapshot file was replaced.
    SnapshotSaved {
        /// Snapshot file name.
        kind: String,
        /// Number of records written.
        count: usize,
    },

    /// Finished pulling everything requested.
    PullComplete {
        /// Number of snapshot files written.
        snapshots: usize,
    },
}

/// Callback for progress updates during pull operations.
pub type ProgressCallback = Box<dyn Fn(PullProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: PullProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
