#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod repos;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod utils;
pub mod ws;

// Re-exports for public API
pub use config::{DbProfile, HubConfig, ServiceConfig};
pub use domain::{Assignment, Principal, RoleSelection};
pub use error::AppError;
pub use errors::domain::DomainError;
pub use infra::db::connect_db;
pub use infra::state::{build_state, StateBuilder};
pub use services::{GameService, PlayerAssignment};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    backend_test_support::logging::init();
}
