//! Environment-driven configuration.

pub mod db;
pub mod realtime;
pub mod service;

pub use db::DbProfile;
pub use realtime::HubConfig;
pub use service::ServiceConfig;
