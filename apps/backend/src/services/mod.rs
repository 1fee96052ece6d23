pub mod games;
pub mod locks;

pub use games::{GameService, PlayerAssignment};
pub use locks::{GameLockGuard, GameLocks};
