// promptforge-service/src/models/invitations.rs
use crate::models::TeamRole;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// Invitations expire 7 days after creation
pub const INVITATION_TTL_DAYS: i64 = 7;

// Lifecycle of an invitation. Never stored: always derived from the
// timestamps so the two cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

// A token-addressable, time-bounded offer to join a team with a given role.
// Only the SHA-256 of the bearer token is persisted; the plaintext appears
// once in the create response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Invitation {
    pub id: String,
    pub token_hash: String,
    pub team_id: String,
    pub invited_email: String,
    pub invited_by: String,
    pub role: TeamRole,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn new(
        team_id: String,
        invited_email: String,
        invited_by: String,
        role: TeamRole,
        token_hash: String,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            token_hash,
            team_id,
            invited_email,
            invited_by,
            role,
            created_at: now,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            accepted_at: None,
        }
    }

    // Check if invitation is expired. Expiry is lazy: there is no sweep, the
    // deadline is evaluated wherever the row is read.
    pub fn is_expired(&self) -> bool {
        self.accepted_at.is_none() && Utc::now() >= self.expires_at
    }

    pub fn status(&self) -> InvitationStatus {
        if self.accepted_at.is_some() {
            InvitationStatus::Accepted
        } else if Utc::now() >= self.expires_at {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Pending
        }
    }
}

// Request to create a new invitation
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateInvitationRequest {
    pub email: String,
    pub role: TeamRole,
}

// Public view of an invitation, enriched for display
#[derive(Serialize, Deserialize, Debug)]
pub struct InvitationView {
    pub id: String,
    pub team_id: String,
    pub team_name: Option<String>, // Populated when retrieving
    pub invited_email: String,
    pub invited_by: String,
    pub invited_by_name: Option<String>, // Populated when retrieving
    pub role: TeamRole,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
