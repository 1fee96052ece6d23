use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Games {
    Table,
    Id,
    Status,
    ModeratorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Players {
    Table,
    Id,
    GameId,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
    Slug,
    Team,
    Abilities,
}

#[derive(Iden)]
enum GameRoles {
    Table,
    Id,
    GameId,
    PlayerId,
    RoleId,
    AssignedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // games table; id is the six character join code
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Games::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Games::ModeratorId).text().not_null())
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_games_moderator_id")
                    .table(Games::Table)
                    .col(Games::ModeratorId)
                    .to_owned(),
            )
            .await?;

        // players table
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Players::GameId).string_len(16).not_null())
                    .col(ColumnDef::new(Players::Name).text().not_null())
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_game_id")
                            .from(Players::Table, Players::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // names are unique per game; joins rely on this index, not a prior read
        manager
            .create_index(
                Index::create()
                    .name("ux_players_game_name")
                    .table(Players::Table)
                    .col(Players::GameId)
                    .col(Players::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // roles catalog
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Roles::Name).text().not_null())
                    .col(ColumnDef::new(Roles::Slug).text().not_null())
                    .col(ColumnDef::new(Roles::Team).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Roles::Abilities)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_roles_slug")
                    .table(Roles::Table)
                    .col(Roles::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // game_roles: one row per (game, player)
        manager
            .create_table(
                Table::create()
                    .table(GameRoles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameRoles::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(GameRoles::GameId).string_len(16).not_null())
                    .col(ColumnDef::new(GameRoles::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(GameRoles::RoleId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GameRoles::AssignedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_roles_game_id")
                            .from(GameRoles::Table, GameRoles::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_roles_player_id")
                            .from(GameRoles::Table, GameRoles::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_roles_role_id")
                            .from(GameRoles::Table, GameRoles::RoleId)
                            .to(Roles::Table, Roles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_game_roles_game_player")
                    .table(GameRoles::Table)
                    .col(GameRoles::GameId)
                    .col(GameRoles::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop in reverse order + drop index before table
        manager
            .drop_index(
                Index::drop()
                    .name("ux_game_roles_game_player")
                    .table(GameRoles::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(GameRoles::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ux_roles_slug")
                    .table(Roles::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ux_players_game_name")
                    .table(Players::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ix_games_moderator_id")
                    .table(Games::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await?;

        Ok(())
    }
}
