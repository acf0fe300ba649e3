//! Command implementations
//!
//! Every command builds the same set of services from the resolved
//! configuration, so the CLI and the HTTP API share one ledger.

pub mod generate;
pub mod history;
pub mod serve;
pub mod stats;

use anyhow::{Context, Result};
use codegen_core::{
    GeminiClient, GenerationClient, GenerationOrchestrator, ServiceConfig, StatisticsService,
    open_store,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Long-lived components shared by every request
#[derive(Clone)]
pub struct Services {
    pub orchestrator: GenerationOrchestrator,
    pub stats: Arc<StatisticsService>,
}

impl Services {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let client = GeminiClient::new(config.gemini.clone())
            .context("Failed to create Gemini client")?;
        if !client.is_configured() {
            warn!("No usable Gemini API key configured; generation requests will fail");
        }

        let store = open_store(&config.storage).context("Failed to open history store")?;
        info!("Using {:?} history store", config.storage.backend);

        Ok(Self::new(Arc::new(client), store, Duration::from_secs(config.cache.ttl_secs)))
    }

    pub fn new(
        client: Arc<dyn GenerationClient>,
        store: Arc<dyn codegen_core::history::HistoryStore>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            orchestrator: GenerationOrchestrator::new(client, store.clone()),
            stats: Arc::new(StatisticsService::new(store, cache_ttl)),
        }
    }
}
