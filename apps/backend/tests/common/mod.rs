#![allow(dead_code)]

// tests/common/mod.rs
use std::time::Duration;

use backend::config::DbProfile;
use backend::domain::Principal;
use backend::entities::roles::Team;
use backend::infra::state::build_state;
use backend::repos::roles::{self, Role};
use backend::state::AppState;
use backend::ws::hub::{ActiveGames, Outbox};
use backend::ws::protocol::WireEvent;
use backend_test_support::unique_helpers::{unique_moderator, unique_slug};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Fresh in-memory store, migrated, with a fixed distribution seed.
pub async fn test_state() -> AppState {
    build_state()
        .with_db(DbProfile::InMemory)
        .with_rng_seed(42)
        .build()
        .await
        .expect("build test state with in-memory DB")
}

pub fn moderator() -> Principal {
    Principal::new(unique_moderator()).expect("non-blank moderator id")
}

/// Seed one catalog role per name; slugs are made unique.
pub async fn seed_roles(state: &AppState, names: &[&str]) -> Vec<Role> {
    let mut out = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let team = if i == 0 { Team::Mafia } else { Team::Village };
        let role = roles::create_role(state.db(), name, &unique_slug(name), team, &["vote"])
            .await
            .expect("seed role");
        out.push(role);
    }
    out
}

/// Next event on `outbox`, failing the test if none arrives quickly.
pub async fn next_event(outbox: &mut Outbox) -> WireEvent {
    tokio::time::timeout(Duration::from_secs(2), outbox.recv())
        .await
        .expect("event should arrive in time")
        .expect("outbox should still be open")
}

/// True once the hub has closed `outbox` and nothing is left in it.
pub async fn is_closed(outbox: &mut Outbox) -> bool {
    matches!(
        tokio::time::timeout(Duration::from_secs(2), outbox.recv()).await,
        Ok(None)
    )
}

/// Wait until the hub has processed everything sent before this call.
pub async fn hub_barrier(state: &AppState) {
    state.hub.send(ActiveGames).await.expect("hub is running");
}
