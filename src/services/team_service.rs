// promptforge-service/src/services/team_service.rs
use crate::models::{Context, Membership, ServiceError, SubscriptionTier, Team, TeamContext, TeamRole};
use crate::services::authorization;
use crate::utils::{invitation_storage, team_lock, team_storage, user_directory};
use chrono::Utc;
use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use uuid::Uuid;

// Free-tier teams are capped; Pro teams are uncapped
pub const FREE_TEAM_MEMBER_LIMIT: usize = 5;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9-]{3,30}$").unwrap();
}

fn validate_team_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.len() < 2 || trimmed.len() > 50 {
        return Err(ServiceError::Validation {
            field: "name".to_string(),
            reason: "Team name must be 2-50 characters".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn validate_slug(slug: &str) -> Result<(), ServiceError> {
    if !SLUG_RE.is_match(slug) {
        return Err(ServiceError::Validation {
            field: "slug".to_string(),
            reason: "Slug must be 3-30 lowercase letters, digits or dashes".to_string(),
        });
    }
    Ok(())
}

// Create a team and its first admin membership as one unit. A team is never
// observable without an admin.
pub fn create_team(context: &Context, name: &str, slug: &str) -> Result<Team, ServiceError> {
    // Team creation is a paid-tier capability
    if !context.is_pro_user {
        return Err(ServiceError::SubscriptionRequired);
    }

    let name = validate_team_name(name)?;
    validate_slug(slug)?;

    // Creations serialize so the slug uniqueness check holds under
    // concurrent requests
    let section = team_lock::MUTATION_LOCKS.guard_for(team_lock::TEAM_CREATE_KEY)?;
    let _guard = section.lock().map_err(|_| ServiceError::InternalServerError)?;

    if team_storage::find_team_by_slug(slug)?.is_some() {
        return Err(ServiceError::SlugTaken);
    }

    let team = Team {
        id: Uuid::new_v4().to_string(),
        name,
        slug: slug.to_string(),
        owner_id: context.user.id.clone(),
        created_at: Utc::now(),
    };

    team_storage::save_team(&team)?;

    let membership = Membership {
        team_id: team.id.clone(),
        user_id: context.user.id.clone(),
        role: TeamRole::Admin,
        joined_at: Utc::now(),
    };

    if let Err(err) = team_storage::save_team_members(&team.id, &[membership]) {
        // Undo the team row rather than leave a memberless team behind
        error!("❌ Failed to write first membership for team: {}", team.id);
        team_storage::delete_team(&team.id)?;
        return Err(err);
    }

    info!("✅ Team created: {} ({})", team.slug, team.id);
    Ok(team)
}

// Rename a team
pub fn update_team(team_context: &TeamContext, name: &str) -> Result<Team, ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let name = validate_team_name(name)?;

    let mut team = team_context.team.clone();
    team.name = name;
    team_storage::save_team(&team)?;

    info!("✅ Team updated: {}", team.id);
    Ok(team)
}

// Delete a team with its memberships and invitations as one unit
pub fn delete_team(team_context: &TeamContext) -> Result<(), ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let team_id = &team_context.team.id;

    let section = team_lock::MUTATION_LOCKS.guard_for(team_id)?;
    let _guard = section.lock().map_err(|_| ServiceError::InternalServerError)?;

    invitation_storage::delete_team_invitations(team_id)?;
    team_storage::delete_team_members(team_id)?;
    team_storage::delete_team(team_id)?;

    info!("✅ Team deleted: {}", team_id);
    Ok(())
}

// Capacity check. The owner's tier is read from the directory at every call:
// a downgraded owner caps the team immediately, an upgrade lifts the cap
// with no migration step. Counts current memberships, never a cached number.
pub fn can_add_member(team: &Team) -> Result<bool, ServiceError> {
    let owner = match user_directory::find_user_by_id(&team.owner_id)? {
        Some(owner) => owner,
        None => {
            // Fail closed when the owner record is gone
            warn!("❌ Owner: {} of team: {} not found in directory", team.owner_id, team.id);
            return Ok(false);
        }
    };

    if owner.subscription_tier == SubscriptionTier::Pro {
        return Ok(true);
    }

    let members = team_storage::get_team_members(&team.id)?;
    Ok(members.len() < FREE_TEAM_MEMBER_LIMIT)
}

// Add a user to a team directly
pub fn add_member(
    team_context: &TeamContext,
    user_id: &str,
    role: TeamRole,
) -> Result<Membership, ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let team = &team_context.team;

    if user_directory::find_user_by_id(user_id)?.is_none() {
        return Err(ServiceError::Validation {
            field: "user_id".to_string(),
            reason: "Unknown user".to_string(),
        });
    }

    let section = team_lock::MUTATION_LOCKS.guard_for(&team.id)?;
    let _guard = section.lock().map_err(|_| ServiceError::InternalServerError)?;

    let mut members = team_storage::get_team_members(&team.id)?;

    if members.iter().any(|m| m.user_id == user_id) {
        return Err(ServiceError::AlreadyMember);
    }

    // Capacity re-checked at the moment of mutation
    if !can_add_member(team)? {
        return Err(ServiceError::CapacityExceeded);
    }

    let membership = Membership {
        team_id: team.id.clone(),
        user_id: user_id.to_string(),
        role,
        joined_at: Utc::now(),
    };

    members.push(membership.clone());
    team_storage::save_team_members(&team.id, &members)?;

    info!("✅ User: {} added to team: {} with role: {}", user_id, team.id, role);
    Ok(membership)
}

// Remove a member from a team
pub fn remove_member(team_context: &TeamContext, user_id: &str) -> Result<(), ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let team = &team_context.team;

    let section = team_lock::MUTATION_LOCKS.guard_for(&team.id)?;
    let _guard = section.lock().map_err(|_| ServiceError::InternalServerError)?;

    let mut members = team_storage::get_team_members(&team.id)?;

    if !members.iter().any(|m| m.user_id == user_id) {
        return Err(ServiceError::Validation {
            field: "user_id".to_string(),
            reason: "Not a member of this team".to_string(),
        });
    }

    // The admin count is taken from the snapshot about to be written, inside
    // the critical section, so concurrent removals cannot both pass
    authorization::ensure_admin_remains(&members, user_id)?;

    members.retain(|m| m.user_id != user_id);
    team_storage::save_team_members(&team.id, &members)?;

    info!("✅ User: {} removed from team: {}", user_id, team.id);
    Ok(())
}

// Change a member's role
pub fn update_member_role(
    team_context: &TeamContext,
    user_id: &str,
    role: TeamRole,
) -> Result<Membership, ServiceError> {
    authorization::ensure_team_admin(team_context)?;

    let team = &team_context.team;

    let section = team_lock::MUTATION_LOCKS.guard_for(&team.id)?;
    let _guard = section.lock().map_err(|_| ServiceError::InternalServerError)?;

    let mut members = team_storage::get_team_members(&team.id)?;

    let index = match members.iter().position(|m| m.user_id == user_id) {
        Some(index) => index,
        None => {
            return Err(ServiceError::Validation {
                field: "user_id".to_string(),
                reason: "Not a member of this team".to_string(),
            })
        }
    };

    // Demotions must not leave the team without an admin
    if role == TeamRole::Member {
        authorization::ensure_admin_remains(&members, user_id)?;
    }

    members[index].role = role;
    let membership = members[index].clone();
    team_storage::save_team_members(&team.id, &members)?;

    info!("✅ Role for user: {} in team: {} set to: {}", user_id, team.id, role);
    Ok(membership)
}

// List the members of a team
pub fn list_members(team_context: &TeamContext) -> Result<Vec<Membership>, ServiceError> {
    team_storage::get_team_members(&team_context.team.id)
}

// List the teams the caller belongs to
pub fn teams_for_user(context: &Context) -> Result<Vec<Team>, ServiceError> {
    team_storage::get_teams_for_user(&context.user.id)
}
