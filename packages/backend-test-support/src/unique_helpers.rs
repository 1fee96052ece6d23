//! Unique fixture values so tests sharing a database never collide.

use ulid::Ulid;

/// `{prefix}-{ulid}`
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new())
}

/// Moderator id for a fresh principal.
pub fn unique_moderator() -> String {
    unique_str("mod")
}

/// Lowercase role slug, unique across the catalog.
pub fn unique_slug(prefix: &str) -> String {
    unique_str(prefix).to_ascii_lowercase()
}
