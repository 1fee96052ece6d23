//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; repos convert it into
//! `crate::errors::domain::DomainError` here. Raw driver messages are logged
//! but never copied into the error detail.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

const SQLITE_UNIQUE_PREFIX: &str = "UNIQUE constraint failed: ";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Extract the column list from SQLite "UNIQUE constraint failed: t.a, t.b" messages.
fn extract_sqlite_columns(error_msg: &str) -> Option<Vec<&str>> {
    let start = error_msg.find(SQLITE_UNIQUE_PREFIX)? + SQLITE_UNIQUE_PREFIX.len();
    let rest = error_msg[start..].lines().next().unwrap_or_default();
    let columns = rest
        .split(',')
        .map(|c| c.trim().trim_matches('"').trim_end_matches(')'))
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>();
    (!columns.is_empty()).then_some(columns)
}

/// Map SQLite table.column lists to domain-specific conflict errors.
fn map_sqlite_columns_to_conflict(columns: &[&str]) -> Option<(ConflictKind, &'static str)> {
    match columns {
        ["players.game_id", "players.name"] => Some((
            ConflictKind::PlayerNameTaken,
            "Player name already taken in this game",
        )),
        ["games.id"] => Some((ConflictKind::GameCodeCollision, "Game code already exists")),
        ["game_roles.game_id", "game_roles.player_id"] => Some((
            ConflictKind::RolesAlreadyAssigned,
            "Roles already assigned for this game",
        )),
        ["roles.slug"] => Some((
            ConflictKind::Other("UniqueRoleSlug".into()),
            "Role slug already exists",
        )),
        _ => None,
    }
}

/// Map PostgreSQL constraint names to domain-specific conflict errors.
fn map_postgres_constraint_to_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    if error_msg.contains("ux_players_game_name") {
        return Some((
            ConflictKind::PlayerNameTaken,
            "Player name already taken in this game",
        ));
    }
    if error_msg.contains("games_pkey") {
        return Some((ConflictKind::GameCodeCollision, "Game code already exists"));
    }
    if error_msg.contains("ux_game_roles_game_player") {
        return Some((
            ConflictKind::RolesAlreadyAssigned,
            "Roles already assigned for this game",
        ));
    }
    if error_msg.contains("ux_roles_slug") {
        return Some((
            ConflictKind::Other("UniqueRoleSlug".into()),
            "Role slug already exists",
        ));
    }
    None
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(
                NotFoundKind::Other("Record".into()),
                "Record not found",
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with("GAME_NOT_FOUND:") => {
            let game_id = msg.trim_start_matches("GAME_NOT_FOUND:");
            warn!(game_id, "Game not found");
            return DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"));
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %error_msg, "Unique constraint violation");

        if let Some(columns) = extract_sqlite_columns(&error_msg) {
            if let Some((kind, detail)) = map_sqlite_columns_to_conflict(&columns) {
                return DomainError::conflict(kind, detail);
            }
        }

        if let Some((kind, detail)) = map_postgres_constraint_to_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }

        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    // Serializable isolation aborts the loser of a read/write race.
    if mentions_sqlstate(&error_msg, "40001") || error_msg.contains("could not serialize access")
    {
        warn!(raw_error = %error_msg, "Serialization failure");
        return DomainError::conflict(
            ConflictKind::Other("Serialization".into()),
            "Concurrent update detected; please retry",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(raw_error = %error_msg, "Foreign key constraint violation");
        return DomainError::validation_other("Foreign key constraint violation");
    }

    if error_msg.contains("timeout")
        || error_msg.contains("pool")
        || error_msg.contains("database is locked")
    {
        warn!(raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}
