use ghmigrate::github::{Team, User};
use ghmigrate::{OrgConfig, SnapshotStore, UserField};

/// Handle `ghmigrate users [--field F] [--team SLUG]`.
pub(crate) fn handle_users(
    field: UserField,
    team: Option<&str>,
    config: &OrgConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = SnapshotStore::new(&config.data_dir);
    let users = match team {
        Some(slug) => store
            .team_members(slug)?
            .ok_or_else(|| format!("Team '{}' not found in the cached teams", slug))?,
        None => store.load_users()?,
    };

    for value in field_values(&users, field) {
        println!("{}", value);
    }
    Ok(())
}

/// Handle `ghmigrate teams`.
pub(crate) fn handle_teams(config: &OrgConfig) -> Result<(), Box<dyn std::error::Error>> {
    let teams = SnapshotStore::new(&config.data_dir).load_teams()?;
    for line in team_lines(&teams) {
        println!("{}", line);
    }
    Ok(())
}

/// Values of `field` for each user, skipping empty ones.
pub(crate) fn field_values(users: &[User], field: UserField) -> Vec<String> {
    users.iter().filter_map(|u| field.value(u)).collect()
}

pub(crate) fn team_lines(teams: &[Team]) -> Vec<String> {
    teams.iter().map(|t| t.slug.clone()).collect()
}
