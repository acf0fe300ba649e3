//! Core functionality for the code generation service
//!
//! This crate holds everything except the outer surfaces: the Gemini
//! generation client, the history ledger, the orchestrator that ties them
//! together, and the statistics layer read by the HTTP API and the CLI.
//! Test doubles live in the `testing` module behind the `testing` feature.

pub mod config;
pub mod generation;
pub mod history;
pub mod llm;
pub mod stats;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use config::{StorageBackend, StorageConfig};
use history::{HistoryStore, InMemoryHistoryStore, SqliteHistoryStore};
use std::sync::Arc;
use tracing::info;

pub use config::ServiceConfig;
pub use generation::{GenerationOrchestrator, GenerationOutcome, GenerationRequest};
pub use llm::{GeminiClient, GenerationClient};
pub use stats::StatisticsService;

/// Open the ledger backend named by `config`
pub fn open_store(config: &StorageConfig) -> history::Result<Arc<dyn HistoryStore>> {
    match config.backend {
        StorageBackend::Sqlite => Ok(Arc::new(SqliteHistoryStore::open(&config.path)?)),
        StorageBackend::Memory => {
            info!("Using in-memory history; records are lost on exit");
            Ok(Arc::new(InMemoryHistoryStore::new()))
        }
    }
}
