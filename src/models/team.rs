// promptforge-service/src/models/team.rs
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

// A tenant: the unit of data isolation for collaborative prompt authoring.
// Capacity is not stored here; it is derived from the owner's subscription
// tier at check time.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub owner_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    #[display(fmt = "member")]
    Member,
    #[display(fmt = "admin")]
    Admin,
}

// The (user, team, role) binding granting team-scoped access.
// A user holds at most one role per team.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Membership {
    pub team_id: String,
    pub user_id: String,
    pub role: TeamRole,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub joined_at: DateTime<Utc>,
}
