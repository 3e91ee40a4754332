// promptforge-service/src/utils/session.rs
use crate::models::{Context, GlobalRole, ServiceError, SubscriptionTier, TeamContext, TeamRole};
use crate::utils::{identity, team_storage, user_directory};
use actix_web::http::header;
use actix_web::HttpRequest;
use log::{debug, error};

// Pull the raw bearer credential off the request
fn credential_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ServiceError::Unauthenticated)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ServiceError::Unauthenticated)?;

    identity::extract_token_from_header(auth_str)
}

// Resolve the caller into a full request context. The directory record is
// re-read on every call: a credential may outlive its user, and role/tier
// must reflect the current state, not the state at issue time.
pub fn resolve(req: &HttpRequest) -> Result<Context, ServiceError> {
    let token = credential_from_request(req)?;
    let claims = identity::verify_credential(&token)?;

    let user = match user_directory::find_user_by_id(&claims.sub)? {
        Some(user) => user,
        None => {
            error!("❌ Credential presented for unknown or deleted user: {}", claims.sub);
            return Err(ServiceError::Unauthenticated);
        }
    };

    let is_pro_user = user.subscription_tier == SubscriptionTier::Pro;
    let is_system_admin = user.global_role == GlobalRole::SystemAdmin;

    Ok(Context {
        user,
        is_pro_user,
        is_system_admin,
    })
}

// Resolve the caller within a team context. Unknown slugs and
// known-slug-but-not-a-member both come back as AccessDenied so callers
// cannot probe which teams exist.
pub fn resolve_team(req: &HttpRequest, slug: &str) -> Result<TeamContext, ServiceError> {
    let context = resolve(req)?;

    let team = match team_storage::find_team_by_slug(slug)? {
        Some(team) => team,
        None => {
            debug!("Team slug not found: {}", slug);
            return Err(ServiceError::AccessDenied);
        }
    };

    let membership = match team_storage::find_membership(&team.id, &context.user.id)? {
        Some(membership) => membership,
        None => {
            debug!("User: {} is not a member of team: {}", context.user.id, team.id);
            return Err(ServiceError::AccessDenied);
        }
    };

    Ok(TeamContext {
        context,
        team,
        role: membership.role,
    })
}

// Stricter variant for admin-only routes. Unknown slugs surface as an
// explicit TeamNotFound here; membership and role are still required.
pub fn require_team_admin(req: &HttpRequest, slug: &str) -> Result<TeamContext, ServiceError> {
    let context = resolve(req)?;

    let team = team_storage::find_team_by_slug(slug)?.ok_or(ServiceError::TeamNotFound)?;

    let membership = team_storage::find_membership(&team.id, &context.user.id)?
        .ok_or(ServiceError::AccessDenied)?;

    if membership.role != TeamRole::Admin {
        return Err(ServiceError::AdminRequired);
    }

    Ok(TeamContext {
        context,
        team,
        role: membership.role,
    })
}
