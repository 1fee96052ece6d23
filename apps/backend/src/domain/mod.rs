//! Domain layer: pure session logic with no I/O.

pub mod distribution;
pub mod principal;

#[cfg(test)]
mod tests_props_distribution;

// Re-exports for ergonomics
pub use distribution::{Assignment, RoleDistributor, RoleSelection};
pub use principal::Principal;
