// promptforge-service/src/routes/admin_routes.rs
use crate::models::{ServiceError, SetTierRequest};
use crate::services::authorization;
use crate::utils::{session, user_directory};
use actix_web::{put, web, HttpRequest, HttpResponse};
use log::info;

// Force a user's subscription tier. System-scoped: requires the system-admin
// global role, independent of any team context.
#[put("/admin/users/{user_id}/tier")]
async fn set_user_tier(
    req: HttpRequest,
    path: web::Path<String>,
    data: web::Json<SetTierRequest>,
) -> Result<HttpResponse, ServiceError> {
    let target_user_id = path.into_inner();

    let context = session::resolve(&req)?;
    authorization::ensure_system_admin(&context)?;

    info!("🔧 Setting tier for user: {} to: {}", target_user_id, data.tier);

    let user = user_directory::set_subscription_tier(&target_user_id, data.tier)?;

    Ok(HttpResponse::Ok().json(user))
}

// Register all admin routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(set_user_tier);
}
