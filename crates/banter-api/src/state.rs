//! Application state.

use std::sync::Arc;

use banter_store::{JobStore, RedisJobStore};
use banter_worker::{production_orchestrator, Orchestrator, WorkerConfig};

use crate::config::ApiConfig;
use crate::services::StallSweeper;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub sweeper: Arc<StallSweeper>,
    /// Public base URL published artifacts are served from.
    pub public_base_url: String,
}

impl AppState {
    /// Create production state from the environment.
    pub fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn JobStore> = Arc::new(RedisJobStore::from_env()?);
        let orchestrator = production_orchestrator(Arc::clone(&store), &WorkerConfig::from_env())?;
        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .map_err(|_| anyhow::anyhow!("STORAGE_PUBLIC_BASE_URL not set"))?;

        Ok(Self::new(config, store, orchestrator, public_base_url))
    }

    /// Assemble state from explicit parts. Tests use this with an
    /// in-memory store and scripted pipeline stages.
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn JobStore>,
        orchestrator: Arc<Orchestrator>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let sweeper = Arc::new(StallSweeper::new(
            Arc::clone(&store),
            config.stall_threshold,
            config.list_limit,
        ));

        Self {
            config,
            store,
            orchestrator,
            sweeper,
            public_base_url: public_base_url.into(),
        }
    }
}
