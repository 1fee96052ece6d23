use std::sync::Arc;

use actix::Actor;
use tracing::info;

use crate::config::{DbProfile, HubConfig, ServiceConfig};
use crate::domain::RoleDistributor;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::services::GameService;
use crate::state::app_state::AppState;
use crate::ws::hub::BroadcastHub;

/// Builder for creating AppState instances (used in both tests and gateways).
///
/// `build` starts the hub actor and therefore has to run inside an actix
/// system.
pub struct StateBuilder {
    db_profile: Option<DbProfile>,
    hub_config: HubConfig,
    service_config: ServiceConfig,
    rng_seed: Option<u64>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db_profile: None,
            hub_config: HubConfig::default(),
            service_config: ServiceConfig::default(),
            rng_seed: None,
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = Some(profile);
        self
    }

    pub fn with_hub_config(mut self, hub_config: HubConfig) -> Self {
        self.hub_config = hub_config;
        self
    }

    pub fn with_service_config(mut self, service_config: ServiceConfig) -> Self {
        self.service_config = service_config;
        self
    }

    /// Make role distribution reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Read hub and service settings from the environment.
    pub fn with_env_config(self) -> Result<Self, AppError> {
        Ok(self
            .with_hub_config(HubConfig::from_env()?)
            .with_service_config(ServiceConfig::from_env()?))
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let profile = self
            .db_profile
            .ok_or_else(|| AppError::config("No database profile configured"))?;

        // single entrypoint: connect + migrate
        let db = bootstrap_db(profile).await?;

        let hub = BroadcastHub::new().start();
        let distributor = match self.rng_seed {
            Some(seed) => RoleDistributor::seeded(seed),
            None => RoleDistributor::from_os_rng(),
        };
        let games = Arc::new(GameService::new(
            db.clone(),
            hub.clone(),
            distributor,
            self.service_config,
        ));

        info!(seeded = self.rng_seed.is_some(), "[STATE] built");
        Ok(AppState::new(db, hub, games, self.hub_config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
