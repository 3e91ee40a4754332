// promptforge-service/src/services/invitation_service.rs
use crate::models::{
    Context, Invitation, InvitationStatus, InvitationView, Membership, ServiceError, TeamContext,
    TeamRole,
};
use crate::services::{authorization, team_service};
use crate::utils::{invitation_storage, team_lock, team_storage, user_directory};
use chrono::Utc;
use lazy_static::lazy_static;
use log::{info, warn};
use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::env;

// 48 alphanumeric characters ≈ 285 bits of entropy, above the 256-bit floor.
// The token is the sole authorization proof for acceptance.
const TOKEN_LENGTH: usize = 48;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

// Generate a fresh bearer token from the thread CSPRNG
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

// The ledger stores only the hash of a token
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn service_origin() -> String {
    env::var("SERVICE_ORIGIN").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

#[derive(Debug)]
pub struct CreatedInvitation {
    pub invitation: Invitation,
    pub accept_url: String,
}

// Create an invitation and return its shareable accept URL
pub fn create_invitation(
    team_context: &TeamContext,
    email: &str,
    role: TeamRole,
) -> Result<CreatedInvitation, ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let email = email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(ServiceError::Validation {
            field: "email".to_string(),
            reason: "Invalid email address".to_string(),
        });
    }

    let team = &team_context.team;

    // Creations for the same (team, email) pair serialize, so at most one
    // pending invitation can win a race
    let key = team_lock::invitation_key(&team.id, &email);
    let section = team_lock::MUTATION_LOCKS.guard_for(&key)?;
    let _guard = section.lock().map_err(|_| ServiceError::InternalServerError)?;

    if let Some(user) = user_directory::find_user_by_email(&email)? {
        if team_storage::find_membership(&team.id, &user.id)?.is_some() {
            return Err(ServiceError::AlreadyMember);
        }
    }

    if invitation_storage::find_pending_for_team_email(&team.id, &email)?.is_some() {
        return Err(ServiceError::InvitationAlreadySent);
    }

    if !team_service::can_add_member(team)? {
        return Err(ServiceError::CapacityExceeded);
    }

    let token = generate_token();
    let invitation = Invitation::new(
        team.id.clone(),
        email,
        team_context.context.user.id.clone(),
        role,
        hash_token(&token),
    );

    invitation_storage::save_invitation(&invitation)?;

    info!("✅ Invitation created: {} for team: {}", invitation.id, team.id);

    Ok(CreatedInvitation {
        accept_url: format!("{}/invitations/{}", service_origin(), token),
        invitation,
    })
}

// Pure read; never consumes the token. Expiry shows up here without any
// sweep process having run.
pub fn lookup_invitation(token: &str) -> Result<InvitationView, ServiceError> {
    let invitation = invitation_storage::find_invitation_by_token_hash(&hash_token(token))?
        .ok_or(ServiceError::InvitationNotFound)?;

    enrich(&invitation)
}

// Accept an invitation: the PENDING → ACCEPTED transition, exactly once
pub fn accept_invitation(token: &str, context: &Context) -> Result<Membership, ServiceError> {
    let token_hash = hash_token(token);

    // Locate the team first, then re-read everything inside its critical
    // section; the row may be accepted or cancelled while we wait
    let invitation = invitation_storage::find_invitation_by_token_hash(&token_hash)?
        .ok_or(ServiceError::InvitationNotFound)?;

    let section = team_lock::MUTATION_LOCKS.guard_for(&invitation.team_id)?;
    let _guard = section.lock().map_err(|_| ServiceError::InternalServerError)?;

    let invitation = invitation_storage::find_invitation_by_token_hash(&token_hash)?
        .ok_or(ServiceError::InvitationNotFound)?;

    match invitation.status() {
        InvitationStatus::Accepted => return Err(ServiceError::InvitationAlreadyAccepted),
        InvitationStatus::Expired => return Err(ServiceError::InvitationExpired),
        InvitationStatus::Pending => {}
    }

    // The token travels by link; the accepting account must still be the
    // invited one
    if !context.user.email.eq_ignore_ascii_case(&invitation.invited_email) {
        warn!(
            "❌ User: {} attempted to accept an invitation issued to: {}",
            context.user.id, invitation.invited_email
        );
        return Err(ServiceError::EmailMismatch);
    }

    let team = team_storage::find_team_by_id(&invitation.team_id)?
        .ok_or(ServiceError::InvitationNotFound)?;

    let mut members = team_storage::get_team_members(&team.id)?;
    if members.iter().any(|m| m.user_id == context.user.id) {
        return Err(ServiceError::AlreadyMember);
    }

    // Capacity may have filled up since the invite was sent
    if !team_service::can_add_member(&team)? {
        return Err(ServiceError::CapacityExceeded);
    }

    let membership = Membership {
        team_id: team.id.clone(),
        user_id: context.user.id.clone(),
        role: invitation.role,
        joined_at: Utc::now(),
    };

    members.push(membership.clone());
    team_storage::save_team_members(&team.id, &members)?;

    // Stamp acceptance; revert the membership if the ledger write fails so
    // the pair stays atomic for every other lock holder
    let mut accepted = invitation;
    accepted.accepted_at = Some(Utc::now());
    if let Err(err) = invitation_storage::save_invitation(&accepted) {
        members.retain(|m| m.user_id != context.user.id);
        team_storage::save_team_members(&team.id, &members)?;
        return Err(err);
    }

    info!(
        "✅ Invitation: {} accepted, user: {} joined team: {}",
        accepted.id, context.user.id, team.id
    );
    Ok(membership)
}

// Cancel (delete) a pending invitation. Rows that already left Pending are a
// no-op success so retries stay safe.
pub fn cancel_invitation(
    team_context: &TeamContext,
    invitation_id: &str,
) -> Result<(), ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let invitation = match invitation_storage::find_invitation_by_id(invitation_id)? {
        Some(invitation) if invitation.team_id == team_context.team.id => invitation,
        _ => return Err(ServiceError::InvitationNotFound),
    };

    if invitation.status() == InvitationStatus::Pending {
        invitation_storage::delete_invitation(invitation_id)?;
        info!("✅ Invitation cancelled: {}", invitation_id);
    }

    Ok(())
}

// List a team's invitations with their derived status
pub fn list_invitations(team_context: &TeamContext) -> Result<Vec<InvitationView>, ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let invitations = invitation_storage::get_invitations_for_team(&team_context.team.id)?;
    invitations.iter().map(enrich).collect()
}

// Attach team and inviter names for display
fn enrich(invitation: &Invitation) -> Result<InvitationView, ServiceError> {
    let team_name = team_storage::find_team_by_id(&invitation.team_id)?.map(|team| team.name);

    let invited_by_name = user_directory::find_user_by_id(&invitation.invited_by)?
        .map(|user| user.display_name.unwrap_or(user.email));

    Ok(InvitationView {
        id: invitation.id.clone(),
        team_id: invitation.team_id.clone(),
        team_name,
        invited_email: invitation.invited_email.clone(),
        invited_by: invitation.invited_by.clone(),
        invited_by_name,
        role: invitation.role,
        status: invitation.status(),
        created_at: invitation.created_at,
        expires_at: invitation.expires_at,
    })
}
