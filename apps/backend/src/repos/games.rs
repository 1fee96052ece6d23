//! Game repository functions for domain layer.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::games_sea as games_adapter;
use crate::entities::games;
use crate::entities::games::GameStatus;
use crate::errors::domain::DomainError;

/// Game domain model
///
/// Converted from the database model (`games::Model`) when loaded through
/// repos functions. `id` is the six character join code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: String,
    pub status: GameStatus,
    pub moderator_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: time::OffsetDateTime,
}

impl Game {
    pub fn is_owned_by(&self, moderator_id: &str) -> bool {
        self.moderator_id == moderator_id
    }

    pub fn is_pending(&self) -> bool {
        self.status == GameStatus::Pending
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Option<Game>, DomainError> {
    let game = games_adapter::find_by_id(conn, game_id).await?;
    Ok(game.map(Game::from))
}

/// Find game by ID or return `NotFound(Game)`.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Game, DomainError> {
    let game = games_adapter::require_game(conn, game_id).await?;
    Ok(Game::from(game))
}

/// Load the game and hold its row lock until the transaction ends.
pub async fn lock_for_update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Game, DomainError> {
    let game = games_adapter::lock_for_update(conn, game_id).await?;
    Ok(Game::from(game))
}

pub async fn find_by_moderator<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    moderator_id: &str,
) -> Result<Vec<Game>, DomainError> {
    let rows = games_adapter::find_by_moderator(conn, moderator_id).await?;
    Ok(rows.into_iter().map(Game::from).collect())
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: games_adapter::GameCreate,
) -> Result<Game, DomainError> {
    let game = games_adapter::create_game(conn, dto).await?;
    Ok(Game::from(game))
}

pub async fn update_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    status: GameStatus,
) -> Result<Game, DomainError> {
    let dto = games_adapter::GameUpdateStatus::new(game_id, status);
    let game = games_adapter::update_status(conn, dto).await?;
    Ok(Game::from(game))
}

/// Delete the game row. Returns the number of rows removed.
pub async fn delete_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, DomainError> {
    Ok(games_adapter::delete_game(conn, game_id).await?)
}

impl From<games::Model> for Game {
    fn from(model: games::Model) -> Self {
        Self {
            id: model.id,
            status: model.status,
            moderator_id: model.moderator_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
