//! GitHub organization entities as they appear on the wire and in snapshots.
//!
//! Every type tolerates missing fields on input; nullable API fields are
//! `Option`s so a `null` never fails decoding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub account. Keyed by login; `id == 0` means not yet resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: String,
    pub id: u64,
    pub node_id: String,
    pub avatar_url: String,
    pub url: String,
    pub html_url: String,
    pub organizations_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub site_admin: bool,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
}

impl User {
    /// True once the numeric id is known.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.id != 0
    }

    /// Public email, if one is set and non-empty.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    /// Same account: equal non-zero ids, or logins equal ignoring case.
    pub fn same_account(&self, other: &User) -> bool {
        if self.is_resolved() && other.is_resolved() {
            return self.id == other.id;
        }
        !self.login.is_empty() && self.login.eq_ignore_ascii_case(&other.login)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub login: String,
    pub id: u64,
    pub node_id: String,
    pub url: String,
    pub description: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Non-recursive team reference, used for parents and owning teams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSummary {
    pub id: u64,
    pub node_id: String,
    pub url: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub privacy: String,
    pub permission: String,
    pub members_url: String,
    pub repositories_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    pub id: u64,
    pub node_id: String,
    pub url: String,
    pub html_url: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub privacy: String,
    pub permission: String,
    pub members_url: String,
    pub repositories_url: String,
    pub members_count: u64,
    pub repos_count: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub organization: Option<Organization>,
    pub parent: Option<TeamSummary>,
    /// Fully-detailed members, resolved against the users snapshot.
    pub members: Vec<User>,
    pub repositories: Vec<Repository>,
}

impl Team {
    pub fn summary(&self) -> TeamSummary {
        TeamSummary {
            id: self.id,
            node_id: self.node_id.clone(),
            url: self.url.clone(),
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            privacy: self.privacy.clone(),
            permission: self.permission.clone(),
            members_url: self.members_url.clone(),
            repositories_url: self.repositories_url.clone(),
        }
    }

    /// Whether the cached member list contains `user`.
    pub fn has_member(&self, user: &User) -> bool {
        self.members.iter().any(|m| m.same_account(user))
    }
}

/// Derived lifecycle state of a user's organization membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberState {
    NoMembership,
    Pending,
    Active,
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberState::NoMembership => write!(f, "none"),
            MemberState::Pending => write!(f, "pending"),
            MemberState::Active => write!(f, "active"),
        }
    }
}

/// A user's membership in the organization.
///
/// `Membership::default()` (empty `url`) is the "no record" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Membership {
    pub url: String,
    pub state: String,
    pub role: String,
    pub organization_url: String,
    pub organization: Organization,
    pub user: User,
}

impl Membership {
    #[inline]
    pub fn exists(&self) -> bool {
        !self.url.is_empty()
    }

    /// Any record other than a pending one counts as active, including
    /// one whose `state` is empty or unrecognised.
    pub fn member_state(&self) -> MemberState {
        if !self.exists() {
            return MemberState::NoMembership;
        }
        match self.state.as_str() {
            "pending" => MemberState::Pending,
            _ => MemberState::Active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Invitation {
    pub id: u64,
    pub login: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
    pub inviter: Option<User>,
    pub team_count: u64,
    pub invitation_team_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryPermissions {
    pub admin: bool,
    pub maintain: bool,
    pub push: bool,
    pub triage: bool,
    pub pull: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryLicense {
    pub key: String,
    pub name: String,
    pub spdx_id: Option<String>,
    pub url: Option<String>,
    pub node_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
    pub owner: User,
    pub private: bool,
    pub html_url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub forks_count: u64,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub size: u64,
    pub default_branch: String,
    pub open_issues_count: u64,
    pub is_template: bool,
    pub topics: Vec<String>,
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub has_downloads: bool,
    pub archived: bool,
    pub disabled: bool,
    pub visibility: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub permissions: Option<RepositoryPermissions>,
    pub license: Option<RepositoryLicense>,
    /// Attached by the organization repository pull.
    pub contributors: Vec<User>,
    /// Owning team, set only for repositories fetched through a team.
    pub team: Option<TeamSummary>,
}

/// Printable user attribute, selected by name on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Login,
    Id,
    NodeId,
    Name,
    Email,
    Company,
    Location,
    Blog,
    Bio,
    Type,
    HtmlUrl,
    SiteAdmin,
}

impl UserField {
    pub const ALL: [UserField; 12] = [
        UserField::Login,
        UserField::Id,
        UserField::NodeId,
        UserField::Name,
        UserField::Email,
        UserField::Company,
        UserField::Location,
        UserField::Blog,
        UserField::Bio,
        UserField::Type,
        UserField::HtmlUrl,
        UserField::SiteAdmin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UserField::Login => "login",
            UserField::Id => "id",
            UserField::NodeId => "node_id",
            UserField::Name => "name",
            UserField::Email => "email",
            UserField::Company => "company",
            UserField::Location => "location",
            UserField::Blog => "blog",
            UserField::Bio => "bio",
            UserField::Type => "type",
            UserField::HtmlUrl => "html_url",
            UserField::SiteAdmin => "site_admin",
        }
    }

    /// The field's value for `user`, or `None` when it is empty.
    pub fn value(self, user: &User) -> Option<String> {
        let value = match self {
            UserField::Login => user.login.clone(),
            UserField::Id => {
                if !user.is_resolved() {
                    return None;
                }
                user.id.to_string()
            }
            UserField::NodeId => user.node_id.clone(),
            UserField::Name => user.name.clone().unwrap_or_default(),
            UserField::Email => user.email.clone().unwrap_or_default(),
            UserField::Company => user.company.clone().unwrap_or_default(),
            UserField::Location => user.location.clone().unwrap_or_default(),
            UserField::Blog => user.blog.clone().unwrap_or_default(),
            UserField::Bio => user.bio.clone().unwrap_or_default(),
            UserField::Type => user.kind.clone(),
            UserField::HtmlUrl => user.html_url.clone(),
            UserField::SiteAdmin => user.site_admin.to_string(),
        };
        (!value.is_empty()).then_some(value)
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        UserField::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = UserField::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown user field '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_decodes_nulls_and_missing_fields() {
        let user: User = serde_json::from_str(
            r#"{"login":"octocat","id":583231,"type":"User","name":null,"email":null}"#,
        )
        .unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(user.id, 583231);
        assert_eq!(user.kind, "User");
        assert!(user.name.is_none());
        assert!(user.email().is_none());
        assert!(!user.site_admin);
    }

    #[test]
    fn same_account_prefers_ids_then_login() {
        let a = User {
            login: "Octocat".to_string(),
            id: 1,
            ..Default::default()
        };
        let b = User {
            login: "someone-else".to_string(),
            id: 1,
            ..Default::default()
        };
        let partial = User {
            login: "octocat".to_string(),
            ..Default::default()
        };
        assert!(a.same_account(&b));
        assert!(a.same_account(&partial));
        assert!(!b.same_account(&partial));
        assert!(!User::default().same_account(&User::default()));
    }

    #[test]
    fn membership_sentinel_and_states() {
        assert_eq!(Membership::default().member_state(), MemberState::NoMembership);

        let mut membership = Membership {
            url: "https://api.github.com/orgs/acme/memberships/octocat".to_string(),
            state: "pending".to_string(),
            role: "member".to_string(),
            ..Default::default()
        };
        assert!(membership.exists());
        assert_eq!(membership.member_state(), MemberState::Pending);

        membership.state = "active".to_string();
        assert_eq!(membership.member_state(), MemberState::Active);
        assert_eq!(MemberState::Active.to_string(), "active");
        membership.state = String::new();
        assert!(membership.exists());
        assert_eq!(membership.member_state(), MemberState::Active);
    }

    #[test]
    fn team_decodes_list_shape_and_summarizes() {
        let team: Team = serde_json::from_str(
            r#"{"id":7,"slug":"core","name":"Core","description":null,"privacy":"closed",
                "permission":"pull","parent":{"id":3,"slug":"eng","name":"Engineering"}}"#,
        )
        .unwrap();
        assert_eq!(team.parent.as_ref().map(|p| p.slug.as_str()), Some("eng"));
        assert!(team.members.is_empty());

        let summary = team.summary();
        assert_eq!(summary.id, 7);
        assert_eq!(summary.slug, "core");
        assert_eq!(summary.privacy, "closed");
    }

    #[test]
    fn repository_ignores_unknown_fields() {
        let repo: Repository = serde_json::from_str(
            r#"{"id":1,"name":"widgets","full_name":"acme/widgets","owner":{"login":"acme"},
                "pushed_at":"2024-05-01T12:00:00Z","license":null,"mirror_url":null,
                "topics":["rust"]}"#,
        )
        .unwrap();
        assert_eq!(repo.owner.login, "acme");
        assert_eq!(repo.topics, vec!["rust".to_string()]);
        assert!(repo.pushed_at.is_some());
        assert!(repo.license.is_none());
        assert!(repo.team.is_none());
    }

    #[test]
    fn user_field_parsing_and_values() {
        assert_eq!("email".parse::<UserField>(), Ok(UserField::Email));
        assert_eq!(" HTML_URL ".parse::<UserField>(), Ok(UserField::HtmlUrl));
        let err = "shoe_size".parse::<UserField>().unwrap_err();
        assert!(err.contains("shoe_size"));
        assert!(err.contains("login"));

        let user = User {
            login: "octocat".to_string(),
            id: 42,
            email: Some(String::new()),
            company: Some("GitHub".to_string()),
            ..Default::default()
        };
        assert_eq!(UserField::Login.value(&user).as_deref(), Some("octocat"));
        assert_eq!(UserField::Id.value(&user).as_deref(), Some("42"));
        assert_eq!(UserField::Company.value(&user).as_deref(), Some("GitHub"));
        assert_eq!(UserField::Email.value(&user), None);
        assert_eq!(UserField::Name.value(&user), None);
        assert_eq!(UserField::Id.value(&User::default()), None);
    }
}
