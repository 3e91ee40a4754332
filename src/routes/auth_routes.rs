// promptforge-service/src/routes/auth_routes.rs
use crate::models::ServiceError;
use crate::utils::session;
use actix_web::{get, web, HttpRequest, HttpResponse};
use log::debug;
use serde_json::json;

// Get the resolved view of the current session
#[get("/auth/me")]
async fn me(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    debug!("👤 Get user info request");

    let context = session::resolve(&req)?;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": context.user.id,
        "email": context.user.email,
        "display_name": context.user.display_name,
        "global_role": context.user.global_role,
        "subscription_tier": context.user.subscription_tier,
        "is_pro_user": context.is_pro_user,
        "is_system_admin": context.is_system_admin,
        "created_at": context.user.created_at
    })))
}

// Register all auth routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(me);
}
