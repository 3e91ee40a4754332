// promptforge-service/src/main.rs
use actix_cors::Cors;
use actix_web::{App, HttpServer};
use log::info;
use promptforge_service::routes::{admin_routes, auth_routes, invitation_routes, team_routes};
use promptforge_service::utils::{invitation_storage, team_storage, user_directory};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    // Storage layout is created up front so the first request never races
    // directory creation
    user_directory::ensure_users_dir()?;
    team_storage::ensure_team_dirs()?;
    invitation_storage::ensure_invitations_dir()?;

    info!("🚀 Starting promptforge service at {}", address);

    HttpServer::new(|| {
        App::new()
            .wrap(Cors::permissive())
            .configure(auth_routes::init_routes)
            .configure(admin_routes::init_routes)
            .configure(team_routes::init_routes)
            .configure(invitation_routes::init_routes)
    })
        .bind(address)?
        .run()
        .await
}
