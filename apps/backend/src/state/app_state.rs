use std::sync::Arc;

use actix::Addr;
use sea_orm::DatabaseConnection;

use crate::config::HubConfig;
use crate::services::GameService;
use crate::ws::hub::{BroadcastHub, Connection, Outbox};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Database connection shared with the game service
    pub db: DatabaseConnection,
    /// Realtime hub actor
    pub hub: Addr<BroadcastHub>,
    /// Session lifecycle service
    pub games: Arc<GameService>,
    /// Per-connection delivery limits
    pub hub_config: HubConfig,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        hub: Addr<BroadcastHub>,
        games: Arc<GameService>,
        hub_config: HubConfig,
    ) -> Self {
        Self {
            db,
            hub,
            games,
            hub_config,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// A fresh connection pair sized by the configured outbox capacity.
    pub fn new_connection(&self) -> (Connection, Outbox) {
        Connection::channel(self.hub_config.outbox_capacity)
    }
}
