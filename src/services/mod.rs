// promptforge-service/src/services/mod.rs
pub mod authorization;
pub mod invitation_service;
pub mod team_service;
