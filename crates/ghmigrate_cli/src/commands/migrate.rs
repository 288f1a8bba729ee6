use ghmigrate::{
    GitHubClient, MigrationEngine, MigrationOutcome, OrgConfig, RemoveOutcome,
    SnapshotStore,
};

use crate::commands::pull::{puller, summary_line};

fn engine(config: &OrgConfig) -> Result<MigrationEngine<GitHubClient>, Box<dyn std::error::Error>> {
    let client = GitHubClient::new(config)?;
    let store = SnapshotStore::new(&config.data_dir);
    Ok(MigrationEngine::new(client, store).with_max_snapshot_age(config.max_snapshot_age))
}

/// Handle `ghmigrate migrate <LOGIN> [--refresh]`.
///
/// Missing snapshots are pulled first. With `refresh`, users, memberships
/// and teams are pulled again even when cached.
pub(crate) async fn handle_migrate(
    login: &str,
    refresh: bool,
    config: &OrgConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(summary) = puller(config)?.prepare_migration(refresh).await? {
        tracing::info!("Pulled snapshots ({})", summary_line(&summary));
    }

    let outcome = engine(config)?.migrate(login).await?;
    println!("{}", describe_migration(&outcome));
    Ok(())
}

/// Handle `ghmigrate remove <LOGIN>`.
pub(crate) async fn handle_remove(
    login: &str,
    config: &OrgConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match engine(config)?.remove(login).await? {
        RemoveOutcome::Removed { previous_state } => {
            println!("Removed {} (was {})", login, previous_state);
        }
        RemoveOutcome::NotAMember => {
            println!("{} is not a member of {}; nothing removed", login, config.org);
        }
    }
    Ok(())
}

/// Handle `ghmigrate restore-teams`.
pub(crate) async fn handle_restore_teams(
    config: &OrgConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = engine(config)?.restore_team_memberships().await?;
    println!(
        "Restored {} team membership(s) across {} team(s)",
        summary.memberships, summary.teams
    );
    Ok(())
}

pub(crate) fn describe_migration(outcome: &MigrationOutcome) -> String {
    let action = if outcome.removed {
        format!("Removed ({}) and re-invited", outcome.previous_state)
    } else {
        "Invited".to_string()
    };
    format!(
        "{} {} by {} as {} into {} team(s)",
        action,
        outcome.login,
        outcome.invitee,
        outcome.role,
        outcome.team_ids.len()
    )
}
