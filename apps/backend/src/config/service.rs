//! Game service settings.

use std::env;
use std::time::Duration;

use super::realtime::parse_positive;
use crate::error::AppError;

const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Deadline applied to every store transaction.
    pub store_timeout: Duration,
    /// Game code generation attempts before giving up on collisions.
    pub max_code_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

impl ServiceConfig {
    /// Reads `STORE_TIMEOUT_MS` and `GAME_CODE_ATTEMPTS`, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let store_timeout = parse_positive(&lookup, "STORE_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_timeout);
        let max_code_attempts = match parse_positive(&lookup, "GAME_CODE_ATTEMPTS")? {
            Some(v) => u32::try_from(v)
                .map_err(|_| AppError::config("GAME_CODE_ATTEMPTS is out of range"))?,
            None => defaults.max_code_attempts,
        };

        Ok(Self {
            store_timeout,
            max_code_attempts,
        })
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}
