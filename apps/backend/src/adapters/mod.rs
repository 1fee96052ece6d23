//! SeaORM adapters: entity-level queries returning `DbErr`.

pub mod game_roles_sea;
pub mod games_sea;
pub mod players_sea;
pub mod roles_sea;
