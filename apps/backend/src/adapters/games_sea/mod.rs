//! SeaORM adapter for game repository - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, QueryFilter,
    QuerySelect, Set,
};

use crate::entities::games;

pub mod dto;

pub use dto::{GameCreate, GameUpdateStatus};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

fn game_not_found(game_id: &str) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!("GAME_NOT_FOUND:{game_id}"))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(game_id.to_owned()).one(conn).await
}

/// Find game by ID or return a structured GAME_NOT_FOUND error.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<games::Model, sea_orm::DbErr> {
    find_by_id(conn, game_id)
        .await?
        .ok_or_else(|| game_not_found(game_id))
}

/// Read the game row and take a row lock for the rest of the transaction.
///
/// Postgres gets `SELECT ... FOR UPDATE`; SQLite has no row locks and already
/// serializes writers, so the plain read is issued there.
pub async fn lock_for_update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<games::Model, sea_orm::DbErr> {
    let mut query = games::Entity::find_by_id(game_id.to_owned());
    if conn.get_database_backend() == DatabaseBackend::Postgres {
        query = query.lock_exclusive();
    }
    query.one(conn).await?.ok_or_else(|| game_not_found(game_id))
}

pub async fn find_by_moderator<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    moderator_id: &str,
) -> Result<Vec<games::Model>, sea_orm::DbErr> {
    games::Entity::find()
        .filter(games::Column::ModeratorId.eq(moderator_id))
        .all(conn)
        .await
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let game_active = games::ActiveModel {
        id: Set(dto.id),
        status: Set(games::GameStatus::Pending),
        moderator_id: Set(dto.moderator_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    game_active.insert(conn).await
}

pub async fn update_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameUpdateStatus,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = games::Entity::update_many()
        .col_expr(games::Column::Status, Expr::value(dto.status))
        .col_expr(games::Column::UpdatedAt, Expr::value(now))
        .filter(games::Column::Id.eq(dto.id.as_str()))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(game_not_found(&dto.id));
    }

    require_game(conn, &dto.id).await
}

/// Delete the game row. Child rows must already be gone.
pub async fn delete_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = games::Entity::delete_many()
        .filter(games::Column::Id.eq(game_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
