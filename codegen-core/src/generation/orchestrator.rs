//! Runs one generation attempt end to end

use super::{GenerationFailure, GenerationOutcome, GenerationRequest, ValidationError};
use crate::history::HistoryStore;
use crate::llm::GenerationClient;
use crate::llm::normalize::is_unusable;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const LOGGED_PROMPT_CHARS: usize = 100;

/// Validates a request, calls the generation client, and records the attempt
#[derive(Clone)]
pub struct GenerationOrchestrator {
    client: Arc<dyn GenerationClient>,
    store: Arc<dyn HistoryStore>,
}

impl GenerationOrchestrator {
    pub fn new(client: Arc<dyn GenerationClient>, store: Arc<dyn HistoryStore>) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &dyn GenerationClient {
        self.client.as_ref()
    }

    /// Validate and run; a request that fails validation is neither sent
    /// upstream nor recorded
    pub async fn handle_request(
        &self,
        prompt: &str,
        language: &str,
    ) -> Result<GenerationOutcome, ValidationError> {
        let request = GenerationRequest::new(prompt, language)?;
        Ok(self.generate(&request).await)
    }

    /// Like [`handle_request`](Self::handle_request) but folds validation
    /// problems into a failed outcome with zero execution time
    pub async fn handle(&self, prompt: &str, language: &str) -> GenerationOutcome {
        match self.handle_request(prompt, language).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Rejected generation request: {}", e);
                GenerationOutcome::failure(e.to_string(), prompt, language, 0)
            }
        }
    }

    /// Run a validated request and record it exactly once
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let started = Instant::now();
        info!(
            "Generating {} code for prompt: {}",
            request.language(),
            loggable_prompt(request.prompt())
        );

        let result = self.attempt(request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let outcome = match result {
            Ok(code) => {
                info!("Generated {} code in {}ms", request.language(), elapsed_ms);
                GenerationOutcome::success(code, request.prompt(), request.language(), elapsed_ms)
            }
            Err(failure) => {
                match &failure {
                    GenerationFailure::ExternalService(_) => {
                        error!("Code generation failed after {}ms: {}", elapsed_ms, failure)
                    }
                    _ => warn!("Code generation failed after {}ms: {}", elapsed_ms, failure),
                }
                GenerationOutcome::failure(
                    failure.to_string(),
                    request.prompt(),
                    request.language(),
                    elapsed_ms,
                )
            }
        };

        self.record(&outcome).await;
        outcome
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        if !self.client.is_configured() {
            return Err(GenerationFailure::NotConfigured);
        }

        let code = self
            .client
            .generate(request.prompt(), request.language())
            .await
            .map_err(|e| GenerationFailure::ExternalService(e.to_string()))?;

        if is_unusable(&code) {
            return Err(GenerationFailure::EmptyResult);
        }
        Ok(code)
    }

    /// Ledger failures never change the outcome the caller sees
    async fn record(&self, outcome: &GenerationOutcome) {
        match self.store.save(outcome.to_history_record()).await {
            Ok(saved) => debug!("Recorded generation attempt {}", saved.id),
            Err(e) => error!("Failed to record generation attempt: {}", e),
        }
    }
}

/// Prompt shortened for log lines
pub fn loggable_prompt(prompt: &str) -> String {
    match prompt.char_indices().nth(LOGGED_PROMPT_CHARS) {
        Some((cut, _)) => format!("{}...", &prompt[..cut]),
        None => prompt.to_string(),
    }
}
