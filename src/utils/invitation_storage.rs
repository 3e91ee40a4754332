// promptforge-service/src/utils/invitation_storage.rs
use crate::models::{Invitation, InvitationStatus, ServiceError};
use log::{error, info, warn};
use std::fs;
use std::path::Path;

const INVITATIONS_DIR: &str = "./storage/invitations";

// Initialize invitations directory
pub fn ensure_invitations_dir() -> std::io::Result<()> {
    let dir = Path::new(INVITATIONS_DIR);
    if !dir.exists() {
        info!("Creating invitations directory");
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

// Save invitation to storage
pub fn save_invitation(invitation: &Invitation) -> Result<(), ServiceError> {
    ensure_invitations_dir().map_err(|e| {
        error!("Failed to create invitations directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let invitation_path = format!("{}/{}.json", INVITATIONS_DIR, invitation.id);
    let invitation_json = serde_json::to_string_pretty(invitation).map_err(|e| {
        error!("Failed to serialize invitation: {:?}", e);
        ServiceError::InternalServerError
    })?;

    fs::write(&invitation_path, invitation_json).map_err(|e| {
        error!("Failed to save invitation: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(())
}

// Find invitation by ID
pub fn find_invitation_by_id(invitation_id: &str) -> Result<Option<Invitation>, ServiceError> {
    let invitation_path = format!("{}/{}.json", INVITATIONS_DIR, invitation_id);
    let path = Path::new(&invitation_path);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to read invitation file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let invitation: Invitation = serde_json::from_str(&content).map_err(|e| {
        error!("Failed to parse invitation JSON: {:?}", e);
        ServiceError::InternalServerError
    })?;

    Ok(Some(invitation))
}

// Find invitation by its token hash (the sole lookup key for acceptance)
pub fn find_invitation_by_token_hash(token_hash: &str) -> Result<Option<Invitation>, ServiceError> {
    for invitation in read_all_invitations()? {
        if invitation.token_hash == token_hash {
            return Ok(Some(invitation));
        }
    }

    Ok(None)
}

// Find the pending invitation for a (team, email) pair, if any.
// At most one can exist at a time.
pub fn find_pending_for_team_email(
    team_id: &str,
    email: &str,
) -> Result<Option<Invitation>, ServiceError> {
    for invitation in read_all_invitations()? {
        if invitation.team_id == team_id
            && invitation.invited_email.eq_ignore_ascii_case(email)
            && invitation.status() == InvitationStatus::Pending
        {
            return Ok(Some(invitation));
        }
    }

    Ok(None)
}

// Get all invitations for a team
pub fn get_invitations_for_team(team_id: &str) -> Result<Vec<Invitation>, ServiceError> {
    let invitations = read_all_invitations()?
        .into_iter()
        .filter(|invitation| invitation.team_id == team_id)
        .collect();

    Ok(invitations)
}

// Delete invitation
pub fn delete_invitation(invitation_id: &str) -> Result<bool, ServiceError> {
    let invitation_path = format!("{}/{}.json", INVITATIONS_DIR, invitation_id);
    let path = Path::new(&invitation_path);

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(path).map_err(|e| {
        error!("Failed to delete invitation file: {:?}", e);
        ServiceError::InternalServerError
    })?;

    info!("✅ Deleted invitation: {}", invitation_id);
    Ok(true)
}

// Delete all invitations for a team
pub fn delete_team_invitations(team_id: &str) -> Result<usize, ServiceError> {
    let invitations = get_invitations_for_team(team_id)?;
    let mut deleted_count = 0;

    for invitation in invitations {
        if delete_invitation(&invitation.id)? {
            deleted_count += 1;
        }
    }

    info!("✅ Deleted {} invitations for team: {}", deleted_count, team_id);
    Ok(deleted_count)
}

// Scan the ledger directory
fn read_all_invitations() -> Result<Vec<Invitation>, ServiceError> {
    let mut invitations = Vec::new();
    ensure_invitations_dir().map_err(|e| {
        error!("Failed to ensure invitations directory: {:?}", e);
        ServiceError::InternalServerError
    })?;

    let dir = Path::new(INVITATIONS_DIR);

    for entry_result in fs::read_dir(dir).map_err(|e| {
        error!("Failed to read invitations directory: {:?}", e);
        ServiceError::InternalServerError
    })? {
        let entry = entry_result.map_err(|e| {
            error!("Failed to read directory entry: {:?}", e);
            ServiceError::InternalServerError
        })?;

        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read invitation file: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let invitation: Invitation = match serde_json::from_str(&content) {
                Ok(inv) => inv,
                Err(e) => {
                    warn!("Failed to parse invitation JSON: {:?}", e);
                    continue;
                }
            };

            invitations.push(invitation);
        }
    }

    Ok(invitations)
}
