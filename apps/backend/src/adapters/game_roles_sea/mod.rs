//! SeaORM adapter for role assignments - generic over ConnectionTrait.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::game_roles;

pub mod dto;

pub use dto::GameRoleCreate;

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

/// Insert every assignment for a game in a single statement.
pub async fn insert_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    rows: &[GameRoleCreate],
) -> Result<(), sea_orm::DbErr> {
    if rows.is_empty() {
        return Ok(());
    }
    let now = time::OffsetDateTime::now_utc();
    let models = rows.iter().map(|row| game_roles::ActiveModel {
        game_id: Set(game_id.to_owned()),
        player_id: Set(row.player_id),
        role_id: Set(row.role_id),
        assigned_at: Set(now),
        ..Default::default()
    });

    game_roles::Entity::insert_many(models).exec(conn).await?;
    Ok(())
}

pub async fn count_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    game_roles::Entity::find()
        .filter(game_roles::Column::GameId.eq(game_id))
        .count(conn)
        .await
}

pub async fn find_for_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    player_id: i64,
) -> Result<Option<game_roles::Model>, sea_orm::DbErr> {
    game_roles::Entity::find()
        .filter(game_roles::Column::GameId.eq(game_id))
        .filter(game_roles::Column::PlayerId.eq(player_id))
        .one(conn)
        .await
}

/// Assignments of a game ordered by player id.
pub async fn find_all_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Vec<game_roles::Model>, sea_orm::DbErr> {
    game_roles::Entity::find()
        .filter(game_roles::Column::GameId.eq(game_id))
        .order_by_asc(game_roles::Column::PlayerId)
        .all(conn)
        .await
}

pub async fn delete_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = game_roles::Entity::delete_many()
        .filter(game_roles::Column::GameId.eq(game_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
