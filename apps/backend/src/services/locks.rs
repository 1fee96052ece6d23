//! Per-game mutual exclusion for mutating operations.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// One async mutex per game id. Entries exist only while some caller holds
/// or waits for them, so unknown or finished games leave nothing behind.
#[derive(Clone, Default)]
pub struct GameLocks {
    inner: Arc<LockMap>,
}

/// Exclusive access to one game. Dropping it releases the lock and removes
/// the map entry when nobody else is waiting on it.
pub struct GameLockGuard {
    game_id: String,
    locks: Arc<LockMap>,
    _guard: OwnedMutexGuard<()>,
}

impl GameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `game_id`.
    pub async fn lock(&self, game_id: &str) -> GameLockGuard {
        let mutex = self
            .inner
            .entry(game_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        GameLockGuard {
            game_id: game_id.to_owned(),
            locks: Arc::clone(&self.inner),
            _guard: guard,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Drop for GameLockGuard {
    fn drop(&mut self) {
        // Two handles left means the map's and ours: no waiter holds a clone.
        // Waiters clone under the shard lock, so none can appear mid-check.
        self.locks
            .remove_if(&self.game_id, |_, mutex| Arc::strong_count(mutex) == 2);
    }
}
