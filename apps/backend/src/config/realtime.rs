//! Realtime hub settings.

use std::env;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_OUTBOX_CAPACITY: usize = 64;
const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;

/// Per-connection delivery limits for the broadcast hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Events buffered per connection before it is treated as stuck.
    pub outbox_capacity: usize,
    /// Upper bound for a single socket write.
    pub write_timeout: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
            write_timeout: Duration::from_millis(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }
}

impl HubConfig {
    /// Reads `HUB_OUTBOX_CAPACITY` and `HUB_WRITE_TIMEOUT_MS`, falling back to defaults.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let outbox_capacity = parse_positive(&lookup, "HUB_OUTBOX_CAPACITY")?
            .map(|v| v as usize)
            .unwrap_or(defaults.outbox_capacity);
        let write_timeout = parse_positive(&lookup, "HUB_WRITE_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.write_timeout);

        Ok(Self {
            outbox_capacity,
            write_timeout,
        })
    }
}

/// Parse an optional strictly positive integer setting.
pub(crate) fn parse_positive<F>(lookup: &F, key: &str) -> Result<Option<u64>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::config(format!("{key} must be greater than zero"))),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(AppError::config(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}
