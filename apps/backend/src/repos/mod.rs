//! Repository functions for domain layer.

pub mod game_roles;
pub mod games;
pub mod players;
pub mod roles;
