// promptforge-service/src/utils/team_storage.rs
use crate::models::{Membership, ServiceError, Team};
use log::{error, info, warn};
use std::fs;
use std::path::Path;

const TEAMS_DIR: &str = "./storage/teams";
const MEMBERS_DIR: &str = "./storage/members";

// Initialize team storage directories
pub fn ensure_team_dirs() -> std::io::Result<()> {
    let teams_dir = Path::new(TEAMS_DIR);
    if !teams_dir.exists() {
        info!("Creating teams directory");
        fs::create_dir_all(teams_dir)?;
    }

    let members_dir = Path::new(MEMBERS_DIR);
    if !members_dir.exists() {
        info!("Creating members directory");
        fs::create_dir_all(members_dir)?;
    }

    Ok(())
}

// Save a team to storage
pub fn save_team(team: &Team) -> Result<(), ServiceError> {
    ensure_team_dirs().map_err(|e| {
        error!("Failed to create team directories: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let team_path = format!("{}/{}.json", TEAMS_DIR, team.id);
    let team_json = serde_json::to_string_pretty(team).map_err(|e| {
        error!("Failed to serialize team: {:?}", e);
        ServiceError::InternalServerError
    })?;

    fs::write(&team_path, team_json).map_err(|e| {
        error!("Failed to save team: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(())
}

// Find a team by ID
pub fn find_team_by_id(team_id: &str) -> Result<Option<Team>, ServiceError> {
    let team_path = format!("{}/{}.json", TEAMS_DIR, team_id);
    let path = Path::new(&team_path);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read team file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let team: Team = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse team JSON: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(Some(team))
}

// Find a team by slug (slugs are globally unique)
pub fn find_team_by_slug(slug: &str) -> Result<Option<Team>, ServiceError> {
    let dir = Path::new(TEAMS_DIR);

    if !dir.exists() {
        return Ok(None);
    }

    for entry_result in fs::read_dir(dir).map_err(|e| {
        error!("Failed to read teams directory: {:?}", e);
        ServiceError::InternalServerError
    })? {
        let entry = entry_result.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read team file: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let team: Team = match serde_json::from_str(&content) {
                Ok(team) => team,
                Err(e) => {
                    warn!("Failed to parse team JSON: {:?}", e);
                    continue;
                }
            };

            if team.slug == slug {
                return Ok(Some(team));
            }
        }
    }

    Ok(None)
}

// Delete a team
pub fn delete_team(team_id: &str) -> Result<bool, ServiceError> {
    let team_path = format!("{}/{}.json", TEAMS_DIR, team_id);
    let path = Path::new(&team_path);

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(path).map_err(|e| {
        error!("Failed to delete team file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    info!("✅ Deleted team: {}", team_id);
    Ok(true)
}

// Get all memberships of a team. The whole team's membership lives in one
// file so a mutation writes the same snapshot it validated against.
pub fn get_team_members(team_id: &str) -> Result<Vec<Membership>, ServiceError> {
    let members_path = format!("{}/{}.json", MEMBERS_DIR, team_id);
    let path = Path::new(&members_path);

    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read members file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let members: Vec<Membership> = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse members JSON: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(members)
}

// Save the full membership of a team in one write
pub fn save_team_members(team_id: &str, members: &[Membership]) -> Result<(), ServiceError> {
    ensure_team_dirs().map_err(|e| {
        error!("Failed to create team directories: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let members_path = format!("{}/{}.json", MEMBERS_DIR, team_id);
    let members_json = serde_json::to_string_pretty(members).map_err(|e| {
        error!("Failed to serialize members: {:?}", e);
        ServiceError::InternalServerError
    })?;

    fs::write(&members_path, members_json).map_err(|e| {
        error!("Failed to save members: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(())
}

// Find a user's membership in a team
pub fn find_membership(team_id: &str, user_id: &str) -> Result<Option<Membership>, ServiceError> {
    let members = get_team_members(team_id)?;
    Ok(members.into_iter().find(|m| m.user_id == user_id))
}

// Delete all memberships of a team
pub fn delete_team_members(team_id: &str) -> Result<(), ServiceError> {
    let members_path = format!("{}/{}.json", MEMBERS_DIR, team_id);
    let path = Path::new(&members_path);

    if !path.exists() {
        return Ok(());
    }

    fs::remove_file(path).map_err(|e| {
        error!("Failed to delete members file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(())
}

// Get all teams a user belongs to
pub fn get_teams_for_user(user_id: &str) -> Result<Vec<Team>, ServiceError> {
    let mut teams = Vec::new();
    let dir = Path::new(MEMBERS_DIR);

    if !dir.exists() {
        return Ok(teams);
    }

    for entry_result in fs::read_dir(dir).map_err(|e| {
        error!("Failed to read members directory: {:?}", e);
        ServiceError::InternalServerError
    })? {
        let entry = entry_result.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read members file: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let members: Vec<Membership> = match serde_json::from_str(&content) {
                Ok(members) => members,
                Err(e) => {
                    warn!("Failed to parse members JSON: {:?}", e);
                    continue;
                }
            };

            if let Some(membership) = members.iter().find(|m| m.user_id == user_id) {
                if let Some(team) = find_team_by_id(&membership.team_id)? {
                    teams.push(team);
                }
            }
        }
    }

    Ok(teams)
}
