//! Cross-snapshot lookups.

use crate::github::{Membership, Team, User};

pub fn find_user_by_id(users: &[User], id: u64) -> Option<&User> {
    if id == 0 {
        return None;
    }
    users.iter().find(|u| u.id == id)
}

/// The cached membership for `login`, or `Membership::default()` (the "no
/// record" sentinel) when there is none.
pub fn find_membership(memberships: &[Membership], login: &str) -> Membership {
    memberships
        .iter()
        .find(|m| m.user.login.eq_ignore_ascii_case(login))
        .cloned()
        .unwrap_or_default()
}

/// Ids of the teams whose cached members include `user`, in file order.
///
/// Only as fresh as the teams snapshot.
pub fn team_ids_for(teams: &[Team], user: &User) -> Vec<u64> {
    teams
        .iter()
        .filter(|t| t.has_member(user))
        .map(|t| t.id)
        .collect()
}
