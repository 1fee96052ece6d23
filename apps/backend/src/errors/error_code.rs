//! Error codes for the Nightfall session core.
//!
//! This module defines all error codes surfaced at the gateway boundary.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in problem-details responses.

use core::fmt;

/// Centralized error codes.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authorization
    /// Acting principal is not the game's moderator
    NotGameOwner,

    // Request Validation
    /// Moderator identity missing or blank
    InvalidModeratorId,
    /// Game code malformed
    InvalidGameCode,
    /// Player name empty or too long
    InvalidPlayerName,
    /// Role counts do not match the number of players
    InvalidRoleCount,
    /// Role selection empty, zero count, or duplicated role
    InvalidRoleSelection,
    /// Unknown or disallowed status value
    InvalidStatus,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Game not found
    GameNotFound,
    /// Player not found
    PlayerNotFound,
    /// Role not found in the catalog
    RoleNotFound,
    /// No role assigned yet
    RoleNotAssigned,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Player name already used in this game
    PlayerNameTaken,
    /// Roles were already distributed for this game
    RolesAlreadyAssigned,
    /// Game code generation kept colliding
    GameCodeConflict,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // Lifecycle
    /// Game is no longer accepting this operation
    GameNotPending,
    /// Requested status change is not allowed
    InvalidTransition,

    // System Errors
    /// Database unavailable
    DbUnavailable,
    /// Database timeout
    DbTimeout,
    /// Data corruption detected
    DataCorruption,
    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotGameOwner => "NOT_GAME_OWNER",

            Self::InvalidModeratorId => "INVALID_MODERATOR_ID",
            Self::InvalidGameCode => "INVALID_GAME_CODE",
            Self::InvalidPlayerName => "INVALID_PLAYER_NAME",
            Self::InvalidRoleCount => "INVALID_ROLE_COUNT",
            Self::InvalidRoleSelection => "INVALID_ROLE_SELECTION",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::RoleNotFound => "ROLE_NOT_FOUND",
            Self::RoleNotAssigned => "ROLE_NOT_ASSIGNED",
            Self::NotFound => "NOT_FOUND",

            Self::PlayerNameTaken => "PLAYER_NAME_TAKEN",
            Self::RolesAlreadyAssigned => "ROLES_ALREADY_ASSIGNED",
            Self::GameCodeConflict => "GAME_CODE_CONFLICT",
            Self::Conflict => "CONFLICT",

            Self::GameNotPending => "GAME_NOT_PENDING",
            Self::InvalidTransition => "INVALID_TRANSITION",

            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
