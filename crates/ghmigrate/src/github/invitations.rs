//! Pending invitations and invitation creation.

use std::fmt;

use serde::Serialize;
use tracing::info;

use super::client::{ACCEPT_INVITATIONS, GitHubClient};
use super::error::GitHubError;
use super::pagination::{Page, walk_pages};
use super::types::{Invitation, User};
use crate::sync::ProgressCallback;

/// Wire role for ordinary organization members.
pub const ROLE_DIRECT_MEMBER: &str = "direct_member";

/// Highest status the invitation endpoint answers with on success.
const INVITE_MAX_ACCEPTED_STATUS: u16 = 202;

/// Map a membership role to the role the invitation endpoint expects.
///
/// `member` and the empty role become `direct_member`; anything else is sent
/// as is.
pub fn invitation_role(role: &str) -> &str {
    match role {
        "" | "member" => ROLE_DIRECT_MEMBER,
        other => other,
    }
}

/// Who an invitation is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invitee {
    Id(u64),
    Email(String),
}

impl Invitee {
    /// Invite by email only when the numeric id is unknown and an email is.
    pub fn for_user(user: &User) -> Self {
        if !user.is_resolved()
            && let Some(email) = user.email()
        {
            return Invitee::Email(email.to_string());
        }
        Invitee::Id(user.id)
    }
}

impl fmt::Display for Invitee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invitee::Id(id) => write!(f, "user id {}", id),
            Invitee::Email(email) => write!(f, "email {}", email),
        }
    }
}

/// Body of `POST /orgs/{org}/invitations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub team_ids: Vec<u64>,
    pub role: String,
}

impl InvitationRequest {
    pub fn new(invitee: &Invitee, role: &str, team_ids: Vec<u64>) -> Self {
        let (invitee_id, email) = match invitee {
            Invitee::Id(id) => (Some(*id), None),
            Invitee::Email(email) => (None, Some(email.clone())),
        };
        Self {
            invitee_id,
            email,
            team_ids,
            role: invitation_role(role).to_string(),
        }
    }
}

impl GitHubClient {
    pub async fn invitations_page(&self, page: u32) -> Result<Page<Invitation>, GitHubError> {
        let path = format!("/orgs/{}/invitations", self.org());
        self.get_page(&path, ACCEPT_INVITATIONS, page).await
    }

    pub async fn list_invitations(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<Invitation>, GitHubError> {
        walk_pages("invitations", on_progress, |page| self.invitations_page(page))
            .await
            .into_result("invitations")
    }

    /// Invite a user to the organization, optionally straight into teams.
    ///
    /// Statuses 200 through 202 are success; anything above is an API error
    /// carrying the response body.
    pub async fn create_invitation(&self, request: &InvitationRequest) -> Result<(), GitHubError> {
        let path = format!("/orgs/{}/invitations", self.org());
        let response = self.post_json(&path, ACCEPT_INVITATIONS, request).await?;

        if response.status > INVITE_MAX_ACCEPTED_STATUS {
            return Err(GitHubError::Api {
                status: response.status,
                message: response.body_text(),
            });
        }

        info!(
            org = self.org(),
            invitee_id = request.invitee_id,
            email = request.email.as_deref(),
            role = %request.role,
            teams = request.team_ids.len(),
            "Created organization invitation"
        );
        Ok(())
    }
}
