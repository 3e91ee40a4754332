// promptforge-service/src/routes/team_routes.rs
use crate::models::{AddMemberRequest, CreateTeamRequest, ServiceError, UpdateMemberRoleRequest, UpdateTeamRequest};
use crate::services::team_service;
use crate::utils::session;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use log::info;
use serde_json::json;

// Create a new team
#[post("/teams")]
async fn create_team(req: HttpRequest, data: web::Json<CreateTeamRequest>) -> Result<HttpResponse, ServiceError> {
    let context = session::resolve(&req)?;

    info!("📝 Creating new team: {} for user: {}", data.slug, context.user.id);

    let team = team_service::create_team(&context, &data.name, &data.slug)?;

    Ok(HttpResponse::Ok().json(team))
}

// Get all teams for the current user
#[get("/teams")]
async fn get_user_teams(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let context = session::resolve(&req)?;

    info!("📋 Fetching teams for user: {}", context.user.id);

    let teams = team_service::teams_for_user(&context)?;

    info!("✅ Found {} teams for user: {}", teams.len(), context.user.id);

    Ok(HttpResponse::Ok().json(teams))
}

// Get a specific team by slug
#[get("/teams/{slug}")]
async fn get_team(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let slug = path.into_inner();

    let team_context = session::resolve_team(&req, &slug)?;

    info!("🔍 Found team: {} for user: {}", team_context.team.id, team_context.context.user.id);

    Ok(HttpResponse::Ok().json(json!({
        "team": team_context.team,
        "role": team_context.role
    })))
}

// Update a team's name
#[put("/teams/{slug}")]
async fn update_team(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<UpdateTeamRequest>,
) -> Result<HttpResponse, ServiceError> {
    let slug = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;

    info!("🔄 Updating team: {}", team_context.team.id);

    let team = team_service::update_team(&team_context, &data.name)?;

    Ok(HttpResponse::Ok().json(team))
}

// Delete a team
#[delete("/teams/{slug}")]
async fn delete_team(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let slug = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;
    let team_id = team_context.team.id.clone();

    info!("🗑️ Deleting team: {}", team_id);

    team_service::delete_team(&team_context)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Team deleted successfully",
        "team_id": team_id
    })))
}

// Get team members
#[get("/teams/{slug}/members")]
async fn get_team_members(req: HttpRequest, path: web::Path<String>) -> Result<HttpResponse, ServiceError> {
    let slug = path.into_inner();

    let team_context = session::resolve_team(&req, &slug)?;

    let members = team_service::list_members(&team_context)?;

    info!("✅ Found {} members for team: {}", members.len(), team_context.team.id);

    Ok(HttpResponse::Ok().json(members))
}

// Add a user to a team directly
#[post("/teams/{slug}/members")]
async fn add_team_member(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<AddMemberRequest>,
) -> Result<HttpResponse, ServiceError> {
    let slug = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;

    info!("👥 Adding user: {} to team: {}", data.user_id, team_context.team.id);

    let membership = team_service::add_member(&team_context, &data.user_id, data.role)?;

    Ok(HttpResponse::Ok().json(membership))
}

// Update a team member's role
#[put("/teams/{slug}/members/{user_id}")]
async fn update_team_member_role(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    data: web::Json<UpdateMemberRoleRequest>,
) -> Result<HttpResponse, ServiceError> {
    let (slug, target_user_id) = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;

    info!("🔄 Updating role for user: {} in team: {}", target_user_id, team_context.team.id);

    let membership = team_service::update_member_role(&team_context, &target_user_id, data.role)?;

    Ok(HttpResponse::Ok().json(membership))
}

// Remove a member from a team
#[delete("/teams/{slug}/members/{user_id}")]
async fn remove_team_member(
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ServiceError> {
    let (slug, target_user_id) = path.into_inner();

    let team_context = session::require_team_admin(&req, &slug)?;

    info!("🗑️ Removing user: {} from team: {}", target_user_id, team_context.team.id);

    team_service::remove_member(&team_context, &target_user_id)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "User removed from team successfully",
        "user_id": target_user_id,
        "team_id": team_context.team.id
    })))
}

// Register all team routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_team)
        .service(get_user_teams)
        .service(get_team)
        .service(update_team)
        .service(delete_team)
        .service(get_team_members)
        .service(add_team_member)
        .service(update_team_member_role)
        .service(remove_team_member);
}
