//! GitHub organization API client.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Organization entities (users, teams, memberships, ...)
//! - [`client`] - Client creation and request plumbing
//! - [`rate_limit`] - Rate-limit header parsing and cool-down
//! - [`pagination`] - `Link` cursors and the page walker
//! - `members`, `memberships`, `invitations`, `collaborators`, `teams`,
//!   `repos` - per-resource fetchers on [`GitHubClient`]

mod client;
mod collaborators;
mod error;
mod invitations;
mod members;
mod memberships;
pub mod pagination;
pub mod rate_limit;
mod repos;
mod teams;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ACCEPT_DEFAULT, ACCEPT_INVITATIONS, ACCEPT_REPOS, ACCEPT_TEAMS, GitHubClient};
pub use error::{GitHubError, short_error_message};
pub use invitations::{InvitationRequest, Invitee, ROLE_DIRECT_MEMBER, invitation_role};
pub use pagination::{ListPages, Page, PageWalk, parse_link_header, walk_pages};
pub use rate_limit::{DEFAULT_RATE_LIMIT_FLOOR, RateGovernor, RateLimit};
pub use teams::resolve_members;
pub use types::{
    Invitation, MemberState, Membership, Organization, Repository, RepositoryLicense,
    RepositoryPermissions, Team, TeamSummary, User, UserField,
};
