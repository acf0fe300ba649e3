//! Gemini `generateContent` client

use super::errors::{LLMError, LLMResult};
use super::normalize::clean_generated_code;
use super::GenerationClient;
use crate::config::GeminiConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Values copied from sample configs that are not real keys
const PLACEHOLDER_KEYS: &[&str] =
    &["your_gemini_api_key_here", "your-api-key", "your_api_key", "changeme", "<api-key>"];

const USER_AGENT: &str = "AI-Code-Generator/1.0";

/// Client for Google's Gemini text-generation endpoint
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> LLMResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LLMError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Send one instruction and return the first candidate's raw text
    async fn send(&self, instruction: String) -> LLMResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LLMError::config("Gemini API key not set"))?;

        let request = GeminiRequest::from_text(instruction);

        let response = self
            .client
            .post(&self.config.api_url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(LLMError::api(status.as_u16(), body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)?;
        parsed
            .into_generated_text()
            .ok_or_else(|| LLMError::empty("Gemini response contained no candidate text"))
    }

    fn transport_error(&self, err: reqwest::Error) -> LLMError {
        if err.is_timeout() {
            LLMError::timeout(Duration::from_secs(self.config.timeout_secs))
        } else {
            LLMError::network(err.to_string())
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        is_usable_key(self.config.api_key.as_deref())
    }

    async fn generate(&self, prompt: &str, language: &str) -> LLMResult<String> {
        let instruction = build_instruction(prompt, language);
        debug!("Sending request to Gemini API ({} chars)", instruction.len());

        match self.send(instruction).await {
            Ok(raw) => {
                debug!("Gemini returned {} chars", raw.len());
                Ok(clean_generated_code(&raw, language))
            }
            Err(e) => {
                error!("Error calling Gemini API: {}", e);
                Err(e)
            }
        }
    }
}

/// True iff `key` is non-empty and not a known placeholder
pub fn is_usable_key(key: Option<&str>) -> bool {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() => {
            !PLACEHOLDER_KEYS.iter().any(|p| p.eq_ignore_ascii_case(key))
        }
        _ => false,
    }
}

/// Wrap the user's prompt in instructions for a bare, production-style snippet
pub fn build_instruction(prompt: &str, language: &str) -> String {
    format!(
        "Generate clean, production-ready {language} code for the following requirement. \
         Include proper error handling, comments, and follow idiomatic best practices. \
         Only return the code without explanations, surrounding prose or markdown formatting.\n\n\
         Requirement: {prompt}\n\n\
         Programming Language: {language}"
    )
}

/// Gemini API request structure
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiRequest {
    fn from_text(text: String) -> Self {
        Self { contents: vec![RequestContent { parts: vec![Part { text: Some(text) }] }] }
    }
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GeminiResponse {
    fn into_generated_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}
