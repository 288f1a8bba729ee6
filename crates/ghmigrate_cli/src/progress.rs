//! Progress reporting for pull operations.
//!
//! Events are turned into tracing lines on stderr, so output stays readable
//! whether or not a terminal is attached.

use std::sync::Arc;

use ghmigrate::{ProgressCallback, PullProgress};

/// Forwards [`PullProgress`] events to `tracing`.
#[derive(Debug, Default)]
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    /// Wrap this reporter into a callback for [`ghmigrate::Puller::with_progress`].
    pub fn callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| reporter.handle(event))
    }

    pub fn handle(&self, event: PullProgress) {
        match event {
            PullProgress::PullingKind { kind } => {
                tracing::info!("Pulling {}...", kind);
            }
            PullProgress::FetchedPage {
                resource,
                page,
                count,
                total_so_far,
                last_page,
            } => match last_page {
                Some(last) => tracing::debug!(
                    "{}: page {}/{} ({} items, {} total)",
                    resource,
                    page,
                    last,
                    count,
                    total_so_far
                ),
                None => tracing::debug!(
                    "{}: page {} ({} items, {} total)",
                    resource,
                    page,
                    count,
                    total_so_far
                ),
            },
            PullProgress::FetchingDetails { resource, total } => {
                tracing::info!("Fetching details for {} {}", total, resource);
            }
            PullProgress::FetchedDetail {
                resource,
                name,
                index,
                total,
            } => {
                tracing::debug!("{} [{}/{}] {}", resource, index, total, name);
            }
            PullProgress::SnapshotSaved { kind, count } => {
                tracing::info!("Saved {} records to {}", count, kind);
            }
            PullProgress::PullComplete { snapshots } => {
                tracing::info!("Pull complete: {} snapshot(s) written", snapshots);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_accepts_every_event() {
        let reporter = Arc::new(LoggingReporter::new());
        let callback = reporter.callback();

        callback(PullProgress::PullingKind {
            kind: "users.json".to_string(),
        });
        callback(PullProgress::FetchedPage {
            resource: "members".to_string(),
            page: 1,
            count: 100,
            total_so_far: 100,
            last_page: Some(3),
        });
        callback(PullProgress::FetchedPage {
            resource: "members".to_string(),
            page: 1,
            count: 2,
            total_so_far: 2,
            last_page: None,
        });
        callback(PullProgress::FetchingDetails {
            resource: "members".to_string(),
            total: 2,
        });
        callback(PullProgress::FetchedDetail {
            resource: "members".to_string(),
            name: "octocat".to_string(),
            index: 1,
            total: 2,
        });
        callback(PullProgress::SnapshotSaved {
            kind: "users.json".to_string(),
            count: 2,
        });
        callback(PullProgress::PullComplete { snapshots: 1 });

        assert_eq!(Arc::strong_count(&reporter), 2);
    }
}
