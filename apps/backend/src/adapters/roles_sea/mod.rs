//! SeaORM adapter for the role catalog.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::roles;

pub mod dto;

pub use dto::RoleCreate;

pub async fn create_role<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: RoleCreate,
) -> Result<roles::Model, sea_orm::DbErr> {
    let role_active = roles::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        slug: Set(dto.slug),
        team: Set(dto.team),
        abilities: Set(dto.abilities_json),
    };

    role_active.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    role_id: i64,
) -> Result<Option<roles::Model>, sea_orm::DbErr> {
    roles::Entity::find_by_id(role_id).one(conn).await
}

/// Fetch every role whose id is in `role_ids`. Missing ids are simply absent.
pub async fn find_by_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    role_ids: &[i64],
) -> Result<Vec<roles::Model>, sea_orm::DbErr> {
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }
    roles::Entity::find()
        .filter(roles::Column::Id.is_in(role_ids.iter().copied()))
        .order_by_asc(roles::Column::Id)
        .all(conn)
        .await
}

pub async fn find_by_slug<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    slug: &str,
) -> Result<Option<roles::Model>, sea_orm::DbErr> {
    roles::Entity::find()
        .filter(roles::Column::Slug.eq(slug))
        .one(conn)
        .await
}

pub async fn find_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<roles::Model>, sea_orm::DbErr> {
    roles::Entity::find()
        .order_by_asc(roles::Column::Id)
        .all(conn)
        .await
}
