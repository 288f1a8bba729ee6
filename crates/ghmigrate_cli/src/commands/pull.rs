use std::sync::Arc;

use ghmigrate::{GitHubClient, OrgConfig, PullSummary, PullTarget, Puller, SnapshotStore};

use crate::progress::LoggingReporter;

/// Build a puller for `config` that logs its progress.
pub(crate) fn puller(config: &OrgConfig) -> Result<Puller, Box<dyn std::error::Error>> {
    let client = GitHubClient::new(config)?;
    let store = SnapshotStore::new(&config.data_dir);
    let reporter = Arc::new(LoggingReporter::new());
    Ok(Puller::new(client, store).with_progress(reporter.callback()))
}

/// Handle `ghmigrate pull [TARGET]`.
pub(crate) async fn handle_pull(
    target: PullTarget,
    config: &OrgConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = puller(config)?.pull(target).await?;
    println!("{}", summary_line(&summary));
    Ok(())
}

/// One-line summary, e.g. `users.json: 12, teams.json: 3`.
pub(crate) fn summary_line(summary: &PullSummary) -> String {
    if summary.saved.is_empty() {
        return "Nothing pulled".to_string();
    }
    summary
        .saved
        .iter()
        .map(|(kind, count)| format!("{}: {}", kind, count))
        .collect::<Vec<_>>()
        .join(", ")
}
