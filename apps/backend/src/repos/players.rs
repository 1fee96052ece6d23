//! Player repository functions for domain layer (generic over ConnectionTrait).

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::players_sea as players_adapter;
use crate::entities::players;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: i64,
    pub game_id: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

/// Insert a player. A taken name surfaces as `Conflict(PlayerNameTaken)`
/// straight from the unique index.
pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    name: &str,
) -> Result<Player, DomainError> {
    let dto = players_adapter::PlayerCreate::new(game_id, name);
    let player = players_adapter::create_player(conn, dto).await?;
    Ok(Player::from(player))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<Player>, DomainError> {
    let player = players_adapter::find_by_id(conn, player_id).await?;
    Ok(player.map(Player::from))
}

/// Player `player_id` as a member of `game_id`; a player of another game is
/// reported as missing.
pub async fn require_in_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    player_id: i64,
) -> Result<Player, DomainError> {
    find_by_id(conn, player_id)
        .await?
        .filter(|p| p.game_id == game_id)
        .ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Player,
                format!("Player {player_id} not found in game {game_id}"),
            )
        })
}

/// Players of a game in join order.
pub async fn list_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Vec<Player>, DomainError> {
    let rows = players_adapter::find_all_by_game(conn, game_id).await?;
    Ok(rows.into_iter().map(Player::from).collect())
}

pub async fn count_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, DomainError> {
    Ok(players_adapter::count_by_game(conn, game_id).await?)
}

pub async fn delete_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<u64, DomainError> {
    Ok(players_adapter::delete_player(conn, player_id).await?)
}

pub async fn delete_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, DomainError> {
    Ok(players_adapter::delete_by_game(conn, game_id).await?)
}

impl From<players::Model> for Player {
    fn from(model: players::Model) -> Self {
        Self {
            id: model.id,
            game_id: model.game_id,
            name: model.name,
            created_at: model.created_at,
        }
    }
}
