//! Caller identity handed over by the gateway.

use std::fmt;

use crate::errors::domain::{DomainError, ValidationKind};

/// Opaque moderator identity. The gateway resolves it however it
/// authenticates; this crate only compares it against `games.moderator_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal(String);

impl Principal {
    /// Build a principal from a raw id. Blank ids are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidModeratorId,
                "Moderator id must not be empty",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn owns(&self, moderator_id: &str) -> bool {
        self.0 == moderator_id
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        for raw in ["", "   ", "\t\n"] {
            let err = Principal::new(raw).unwrap_err();
            assert!(matches!(
                err,
                DomainError::Validation(ValidationKind::InvalidModeratorId, _)
            ));
        }
    }

    #[test]
    fn ids_are_trimmed_before_comparison() {
        let p = Principal::new("  mod-1 ").unwrap();
        assert_eq!(p.as_str(), "mod-1");
        assert!(p.owns("mod-1"));
        assert!(!p.owns("mod-2"));
    }
}
