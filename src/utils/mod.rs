// promptforge-service/src/utils/mod.rs
use crate::models::{Claims, ServiceError, SubscriptionTier, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{error, info, warn};
use std::env;
use std::fs;
use std::path::Path;

pub mod invitation_storage;
pub mod session;
pub mod team_lock;
pub mod team_storage;

// Identity provider client: the core never stores credentials, it only
// verifies the JWTs the provider issues.
pub mod identity {
    use super::*;

    // Get JWT secret from environment or use default
    fn get_jwt_secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| "promptforge_super_secret_key".to_string())
    }

    // Issue a signed credential for a user (admin tooling and tests)
    pub fn issue_credential(user: &User) -> Result<String, ServiceError> {
        let secret = get_jwt_secret();
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(7))
            .expect("Valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: expiration,
            iat: Utc::now().timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
            .map_err(|_| ServiceError::InternalServerError)
    }

    // Validate and decode an inbound credential
    pub fn verify_credential(token: &str) -> Result<Claims, ServiceError> {
        let secret = get_jwt_secret();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Unauthenticated)
    }

    // Extract the bearer token from an Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthenticated);
        }

        Ok(auth_header.trim_start_matches("Bearer ").to_string())
    }
}

// User directory: profile attributes, global role and subscription tier.
// Team logic reads this; only system-admin tooling and the billing
// collaborator write it.
pub mod user_directory {
    use super::*;

    const USERS_DIR: &str = "./storage/users";

    // Initialize users directory
    pub fn ensure_users_dir() -> std::io::Result<()> {
        let dir = Path::new(USERS_DIR);
        if !dir.exists() {
            info!("Creating users directory");
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    // Save a user to the directory
    pub fn save_user(user: &User) -> Result<(), ServiceError> {
        ensure_users_dir().map_err(|e| {
            error!("Failed to create users directory: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let user_path = format!("{}/{}.json", USERS_DIR, user.id);

        fs::write(
            &user_path,
            serde_json::to_string(&user).map_err(|_| ServiceError::InternalServerError)?,
        )
            .map_err(|_| ServiceError::InternalServerError)
    }

    // Find a user by ID
    pub fn find_user_by_id(id: &str) -> Result<Option<User>, ServiceError> {
        let user_path = format!("{}/{}.json", USERS_DIR, id);
        let path = Path::new(&user_path);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|_| ServiceError::InternalServerError)?;
        let user: User = serde_json::from_str(&content).map_err(|_| ServiceError::InternalServerError)?;

        Ok(Some(user))
    }

    // Find a user by email (emails are unique case-insensitively)
    pub fn find_user_by_email(email: &str) -> Result<Option<User>, ServiceError> {
        let users_dir = Path::new(USERS_DIR);

        if !users_dir.exists() {
            fs::create_dir_all(users_dir).map_err(|_| ServiceError::InternalServerError)?;
            return Ok(None);
        }

        for entry in fs::read_dir(users_dir).map_err(|_| ServiceError::InternalServerError)? {
            let entry = entry.map_err(|_| ServiceError::InternalServerError)?;
            let path = entry.path();

            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                let content = fs::read_to_string(&path).map_err(|_| ServiceError::InternalServerError)?;
                let user: User = match serde_json::from_str(&content) {
                    Ok(user) => user,
                    Err(e) => {
                        warn!("Failed to parse user JSON: {:?}", e);
                        continue;
                    }
                };

                if user.email.eq_ignore_ascii_case(email) {
                    return Ok(Some(user));
                }
            }
        }

        Ok(None)
    }

    // Force a user's subscription tier (system-admin action; billing webhooks
    // use the same path)
    pub fn set_subscription_tier(user_id: &str, tier: SubscriptionTier) -> Result<User, ServiceError> {
        let mut user = match find_user_by_id(user_id)? {
            Some(user) => user,
            None => {
                error!("❌ Cannot set tier, user not found: {}", user_id);
                return Err(ServiceError::Validation {
                    field: "user_id".to_string(),
                    reason: "Unknown user".to_string(),
                });
            }
        };

        user.subscription_tier = tier;
        save_user(&user)?;

        info!("✅ Subscription tier for user: {} set to: {}", user_id, tier);
        Ok(user)
    }
}
