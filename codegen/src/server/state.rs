//! Application state shared across request handlers.

use crate::cli::commands::Services;
use chrono::{DateTime, Utc};
use codegen_core::{GenerationOrchestrator, StatisticsService};
use std::sync::Arc;

pub(crate) struct AppState {
    pub(crate) orchestrator: GenerationOrchestrator,
    pub(crate) stats: Arc<StatisticsService>,
    /// When this server instance was built
    pub(crate) started_at: DateTime<Utc>,
}

impl AppState {
    pub(crate) fn new(services: Services) -> Self {
        Self { orchestrator: services.orchestrator, stats: services.stats, started_at: Utc::now() }
    }
}
