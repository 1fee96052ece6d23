//! Backend test support utilities
//!
//! Shared by the backend's unit and integration tests: logging setup,
//! unique fixture values and problem details assertions.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
