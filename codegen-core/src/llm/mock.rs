//! Mock generation client for testing
//!
//! Only compiled for unit tests.

use super::errors::LLMError;
use super::{GenerationClient, LLMResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Mock generation client for testing
#[derive(Clone)]
pub struct MockGenerationClient {
    configured: bool,
    responses: Arc<Mutex<Vec<LLMResult<String>>>>,
    call_history: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockGenerationClient {
    /// Create a configured client with no queued responses
    pub fn new() -> Self {
        Self {
            configured: true,
            responses: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Client that always succeeds with `code`
    pub fn returning(code: &str) -> Self {
        let client = Self::new();
        client.add_response(Ok(code.to_string()));
        client
    }

    /// Client that always fails with `error`
    pub fn failing(error: LLMError) -> Self {
        let client = Self::new();
        client.add_response(Err(error));
        client
    }

    pub fn set_configured(&mut self, configured: bool) {
        self.configured = configured;
    }

    /// Queue a response; the last one queued is reused once the queue drains
    pub fn add_response(&self, response: LLMResult<String>) {
        self.responses.lock().unwrap().push(response);
    }

    /// (prompt, language) pairs seen so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.call_history.lock().unwrap().clone()
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

fn clone_result(result: &LLMResult<String>) -> LLMResult<String> {
    match result {
        Ok(code) => Ok(code.clone()),
        Err(e) => Err(LLMError::network(e.to_string())),
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, prompt: &str, language: &str) -> LLMResult<String> {
        self.call_history.lock().unwrap().push((prompt.to_string(), language.to_string()));

        let mut responses = self.responses.lock().unwrap();
        match responses.len() {
            0 => Ok("// mock code".to_string()),
            1 => clone_result(&responses[0]),
            _ => responses.remove(0),
        }
    }
}
