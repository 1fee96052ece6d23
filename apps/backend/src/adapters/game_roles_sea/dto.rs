//! DTOs for game_roles_sea adapter.

/// One player-to-role pairing to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRoleCreate {
    pub player_id: i64,
    pub role_id: i64,
}
