//! Game code generation and parsing.
//!
//! Game codes are 6-character strings using Crockford's Base32 alphabet and
//! double as the game's primary key.

use rand::Rng;

use crate::errors::domain::{DomainError, ValidationKind};

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

pub const GAME_CODE_LEN: usize = 6;

/// Draw a fresh code from `rng`. Uniqueness is enforced by the store.
pub fn generate_game_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..GAME_CODE_LEN)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}

/// Normalize a caller-supplied code to the stored form.
pub fn normalize_game_code(raw: &str) -> Result<String, DomainError> {
    let code = raw.trim().to_ascii_uppercase();
    let valid = code.len() == GAME_CODE_LEN && code.bytes().all(|b| CROCKFORD.contains(&b));
    if !valid {
        return Err(DomainError::validation(
            ValidationKind::InvalidGameCode,
            format!("'{raw}' is not a valid game code"),
        ));
    }
    Ok(code)
}
