pub mod app;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::repositories::UserRepository;
use crate::services::UserService;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub user_service: UserService,
    pub metrics: Option<Metrics>,
}

impl AppState {
    /// Wires the repository matching the pool's driver.
    pub fn new(db: Database, config: Config) -> Result<Self> {
        let repo = db.user_repository();
        Self::with_repository(db, config, repo)
    }

    pub fn with_repository(
        db: Database,
        config: Config,
        repo: Arc<dyn UserRepository>,
    ) -> Result<Self> {
        let metrics = if config.metrics_enabled {
            let metrics = Metrics::new()
                .map_err(|err| Error::Internal(format!("failed to register metrics: {}", err)))?;
            Some(metrics)
        } else {
            None
        };
        Ok(Self {
            db,
            config: Arc::new(config),
            user_service: UserService::new(repo),
            metrics,
        })
    }
}
