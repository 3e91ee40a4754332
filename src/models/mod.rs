// promptforge-service/src/models/mod.rs
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

pub mod team;
pub use team::*;

// Invitation ledger models
pub mod invitations;
pub use invitations::*;

// Global role of a user account. System admins may perform system-scoped
// actions; the role grants nothing inside teams.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum GlobalRole {
    #[display(fmt = "standard")]
    Standard,
    #[display(fmt = "system_admin")]
    SystemAdmin,
}

// Subscription tier, owned by the billing collaborator. Always read fresh
// from the directory, never cached per session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[display(fmt = "free")]
    Free,
    #[display(fmt = "pro")]
    Pro,
}

// User directory record
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub global_role: GlobalRole,
    pub subscription_tier: SubscriptionTier,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

// JWT claims carried by an identity-provider credential
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,  // Subject (user ID)
    pub email: String,
    pub exp: usize,   // Expiration time
    pub iat: usize,   // Issued at
}

// Fully-resolved request context. Built once per request by the session
// resolver and passed explicitly; there is no ambient session state.
#[derive(Debug, Clone)]
pub struct Context {
    pub user: User,
    pub is_pro_user: bool,
    pub is_system_admin: bool,
}

// Context for a team-scoped request: the caller is a verified member
#[derive(Debug, Clone)]
pub struct TeamContext {
    pub context: Context,
    pub team: Team,
    pub role: TeamRole,
}

// Request payloads
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateTeamRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateTeamRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AddMemberRequest {
    pub user_id: String,
    pub role: TeamRole,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateMemberRoleRequest {
    pub role: TeamRole,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SetTierRequest {
    pub tier: SubscriptionTier,
}

// Custom error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    InternalServerError,
    Validation { field: String, reason: String },
    Unauthenticated,
    AccessDenied,
    AdminRequired,
    LastAdminProtected,
    SubscriptionRequired,
    TeamNotFound,
    SlugTaken,
    CapacityExceeded,
    AlreadyMember,
    InvitationAlreadySent,
    InvitationNotFound,
    InvitationExpired,
    InvitationAlreadyAccepted,
    EmailMismatch,
}

// Implement Display for ServiceError
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::InternalServerError => write!(f, "Internal Server Error"),
            ServiceError::Validation { field, reason } => write!(f, "Validation failed on '{}': {}", field, reason),
            ServiceError::Unauthenticated => write!(f, "Authentication required"),
            ServiceError::AccessDenied => write!(f, "Access denied"),
            ServiceError::AdminRequired => write!(f, "Team admin role required"),
            ServiceError::LastAdminProtected => write!(f, "A team must keep at least one admin"),
            ServiceError::SubscriptionRequired => write!(f, "Pro subscription required"),
            ServiceError::TeamNotFound => write!(f, "Team not found"),
            ServiceError::SlugTaken => write!(f, "Slug is already taken"),
            ServiceError::CapacityExceeded => write!(f, "Team member limit reached"),
            ServiceError::AlreadyMember => write!(f, "User is already a member of this team"),
            ServiceError::InvitationAlreadySent => write!(f, "A pending invitation already exists for this email"),
            ServiceError::InvitationNotFound => write!(f, "Invitation not found"),
            ServiceError::InvitationExpired => write!(f, "Invitation has expired"),
            ServiceError::InvitationAlreadyAccepted => write!(f, "Invitation has already been accepted"),
            ServiceError::EmailMismatch => write!(f, "Invitation was issued to a different email"),
        }
    }
}

// Implement std::error::Error for ServiceError
impl std::error::Error for ServiceError {}

// Implement ResponseError for ServiceError
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError =>
                HttpResponse::InternalServerError().json(json!({ "error": "Internal Server Error" })),
            ServiceError::Validation { field, reason } =>
                HttpResponse::BadRequest().json(json!({
                    "error": "Validation failed",
                    "field": field,
                    "reason": reason
                })),
            ServiceError::Unauthenticated =>
                HttpResponse::Unauthorized().json(json!({ "error": self.to_string() })),
            ServiceError::AccessDenied | ServiceError::AdminRequired | ServiceError::EmailMismatch =>
                HttpResponse::Forbidden().json(json!({ "error": self.to_string() })),
            ServiceError::SubscriptionRequired =>
                HttpResponse::PaymentRequired().json(json!({ "error": self.to_string() })),
            ServiceError::TeamNotFound | ServiceError::InvitationNotFound =>
                HttpResponse::NotFound().json(json!({ "error": self.to_string() })),
            ServiceError::LastAdminProtected
            | ServiceError::SlugTaken
            | ServiceError::CapacityExceeded
            | ServiceError::AlreadyMember
            | ServiceError::InvitationAlreadySent
            | ServiceError::InvitationAlreadyAccepted =>
                HttpResponse::Conflict().json(json!({ "error": self.to_string() })),
            ServiceError::InvitationExpired =>
                HttpResponse::Gone().json(json!({ "error": self.to_string() })),
        }
    }
}
