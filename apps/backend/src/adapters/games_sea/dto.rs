//! DTOs for games_sea adapter.

use crate::entities::games::GameStatus;

/// DTO for creating a new game.
#[derive(Debug, Clone)]
pub struct GameCreate {
    pub id: String,
    pub moderator_id: String,
}

impl GameCreate {
    pub fn new(id: impl Into<String>, moderator_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            moderator_id: moderator_id.into(),
        }
    }
}

/// DTO for a status change.
#[derive(Debug, Clone)]
pub struct GameUpdateStatus {
    pub id: String,
    pub status: GameStatus,
}

impl GameUpdateStatus {
    pub fn new(id: impl Into<String>, status: GameStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}
