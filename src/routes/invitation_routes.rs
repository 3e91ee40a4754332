// promptforge-service/src/routes/invitation_routes.rs
use crate::models::{CreateInvitationRequest, ServiceError};
use crate::services::invitation_service;
use crate::utils::session;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// Create a new team invitation
#[post("/teams/{slug}/invitations")]
async fn create_invitation(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<CreateInvitationRequest>,
) -> Result<HttpResponse, ServiceError> {
    let slug = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;

    info!("📧 Creating invitation to team: {} for email: {}", team_context.team.id, data.email);

    let created = invitation_service::create_invitation(&team_context, &data.email, data.role)?;

    Ok(HttpResponse::Ok().json(json!({
        "id": created.invitation.id,
        "team_id": created.invitation.team_id,
        "invited_email": created.invitation.invited_email,
        "role": created.invitation.role,
        "expires_at": created.invitation.expires_at,
        "accept_url": created.accept_url
    })))
}

// Get all invitations for a team
#[get("/teams/{slug}/invitations")]
async fn get_team_invitations(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let slug = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;

    let invitations = invitation_service::list_invitations(&team_context)?;

    info!("✅ Found {} invitations for team: {}", invitations.len(), team_context.team.id);

    Ok(HttpResponse::Ok().json(invitations))
}

// Cancel (delete) a pending invitation
#[delete("/teams/{slug}/invitations/{invitation_id}")]
async fn cancel_invitation(
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (slug, invitation_id) = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;

    info!("🗑️ Cancelling invitation: {}", invitation_id);

    invitation_service::cancel_invitation(&team_context, &invitation_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Invitation cancelled"
    })))
}

// Show invitation details. Holding the link is the proof here; the token is
// not consumed.
#[get("/invitations/{token}")]
async fn lookup_invitation(path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let token = path.into_inner();

    let invitation = invitation_service::lookup_invitation(&token)?;

    Ok(HttpResponse::Ok().json(invitation))
}

// Accept an invitation
#[post("/invitations/{token}")]
async fn accept_invitation(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let token = path.into_inner();

    let context = session::resolve(&req)?;

    let membership = invitation_service::accept_invitation(&token, &context)?;

    info!("✅ User: {} joined team: {}", membership.user_id, membership.team_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Invitation accepted successfully",
        "team_id": membership.team_id,
        "role": membership.role
    })))
}

// Register all invitation routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_invitation)
        .service(get_team_invitations)
        .service(cancel_invitation)
        .service(lookup_invitation)
        .service(accept_invitation);
}
