// promptforge-service/src/services/authorization.rs
//
// Pure decision component. Holds no state; every function judges the
// snapshot it is handed. Callers re-read that snapshot inside the same
// critical section as the mutation it gates.
use crate::models::{Context, Membership, ServiceError, TeamContext, TeamRole};
use log::warn;

// System-scoped administrative actions require the system-admin global role.
// The bypass never extends to team-membership actions.
pub fn ensure_system_admin(context: &Context) -> Result<(), ServiceError> {
    if !context.is_system_admin {
        warn!("❌ User: {} attempted a system-scoped action", context.user.id);
        return Err(ServiceError::AccessDenied);
    }
    Ok(())
}

// Admin-only team actions. Membership itself is established by the session
// resolver; a TeamContext only exists for members.
pub fn ensure_team_admin(team_context: &TeamContext) -> Result<(), ServiceError> {
    if team_context.role != TeamRole::Admin {
        warn!(
            "❌ User: {} needs admin role in team: {}",
            team_context.context.user.id, team_context.team.id
        );
        return Err(ServiceError::AdminRequired);
    }
    Ok(())
}

pub fn admin_count(members: &[Membership]) -> usize {
    members.iter().filter(|m| m.role == TeamRole::Admin).count()
}

// Last-admin protection: deny any mutation that would drop the team's admin
// count to zero. Applies to everyone, including the admin acting on
// themselves.
pub fn ensure_admin_remains(
    members: &[Membership],
    target_user_id: &str,
) -> Result<(), ServiceError> {
    let target_is_admin = members
        .iter()
        .any(|m| m.user_id == target_user_id && m.role == TeamRole::Admin);

    if target_is_admin && admin_count(members) <= 1 {
        return Err(ServiceError::LastAdminProtected);
    }

    Ok(())
}
