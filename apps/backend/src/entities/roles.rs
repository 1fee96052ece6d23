use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Team {
    #[sea_orm(string_value = "mafia")]
    Mafia,
    #[sea_orm(string_value = "village")]
    Village,
    #[sea_orm(string_value = "independent")]
    Independent,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub team: Team,
    /// JSON array of ability names.
    #[sea_orm(column_type = "Text")]
    pub abilities: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::game_roles::Entity")]
    GameRoles,
}

impl Related<super::game_roles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GameRoles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
