//! Role assignment repository functions.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::game_roles_sea as game_roles_adapter;
use crate::entities::game_roles;
use crate::errors::domain::DomainError;

pub use game_roles_adapter::GameRoleCreate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRole {
    pub game_id: String,
    pub player_id: i64,
    pub role_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub assigned_at: time::OffsetDateTime,
}

/// Persist all assignments of a game as one batch.
pub async fn create_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    assignments: &[GameRoleCreate],
) -> Result<(), DomainError> {
    game_roles_adapter::insert_many(conn, game_id, assignments).await?;
    Ok(())
}

pub async fn count_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, DomainError> {
    Ok(game_roles_adapter::count_by_game(conn, game_id).await?)
}

pub async fn find_for_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    player_id: i64,
) -> Result<Option<GameRole>, DomainError> {
    let row = game_roles_adapter::find_for_player(conn, game_id, player_id).await?;
    Ok(row.map(GameRole::from))
}

pub async fn list_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Vec<GameRole>, DomainError> {
    let rows = game_roles_adapter::find_all_by_game(conn, game_id).await?;
    Ok(rows.into_iter().map(GameRole::from).collect())
}

pub async fn delete_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, DomainError> {
    Ok(game_roles_adapter::delete_by_game(conn, game_id).await?)
}

impl From<game_roles::Model> for GameRole {
    fn from(model: game_roles::Model) -> Self {
        Self {
            game_id: model.game_id,
            player_id: model.player_id,
            role_id: model.role_id,
            assigned_at: model.assigned_at,
        }
    }
}
