// promptforge-service/src/utils/team_lock.rs
use crate::models::ServiceError;
use lazy_static::lazy_static;
use log::error;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Registry of named guards. Every invariant-sensitive mutation (membership
// changes, team creation, invitation creation) runs inside the critical
// section for its key: re-read state, validate, write. Guards are never held
// across await points; all storage I/O under them is synchronous.
pub struct TeamLockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TeamLockRegistry {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    // Get (or create) the guard for a key
    pub fn guard_for(&self, key: &str) -> Result<Arc<Mutex<()>>, ServiceError> {
        let mut locks = self.locks.lock().map_err(|e| {
            error!("Lock registry poisoned: {:?}", e);
            ServiceError::InternalServerError
        })?;

        Ok(locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }
}

impl Default for TeamLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    pub static ref MUTATION_LOCKS: TeamLockRegistry = TeamLockRegistry::new();
}

// Key for serializing team creation (slug uniqueness check-then-write)
pub const TEAM_CREATE_KEY: &str = "team-create";

// Key for serializing invitation creation per (team, email) pair
pub fn invitation_key(team_id: &str, email: &str) -> String {
    format!("invitation:{}:{}", team_id, email.to_lowercase())
}
