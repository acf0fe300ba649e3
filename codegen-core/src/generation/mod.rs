//! Generation requests, outcomes and the orchestrator that connects the
//! generation client to the history ledger

pub mod orchestrator;

pub use orchestrator::GenerationOrchestrator;

use crate::history::NewHistoryRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const MAX_PROMPT_CHARS: usize = 1000;
pub const MAX_LANGUAGE_CHARS: usize = 50;

/// Languages advertised to clients; requests are not limited to these
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "Java",
    "Python",
    "JavaScript",
    "TypeScript",
    "C++",
    "C#",
    "Go",
    "Rust",
    "Kotlin",
    "Swift",
    "PHP",
    "Ruby",
    "Scala",
    "R",
    "SQL",
    "HTML",
    "CSS",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "Spring Boot",
];

/// Field name → problem, for every field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request: {}", describe(.fields))]
pub struct ValidationError {
    pub fields: BTreeMap<&'static str, String>,
}

fn describe(fields: &BTreeMap<&'static str, String>) -> String {
    fields.iter().map(|(field, problem)| format!("{field}: {problem}")).collect::<Vec<_>>().join("; ")
}

/// Inbound payload before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationInput {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub language: String,
}

/// A validated prompt/language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    language: String,
}

impl GenerationRequest {
    /// Validate and build a request; nothing else happens on failure
    pub fn new(
        prompt: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let prompt = prompt.into();
        let language = language.into();
        let mut fields = BTreeMap::new();

        if prompt.trim().is_empty() {
            fields.insert("prompt", "Prompt cannot be empty".to_string());
        } else if prompt.chars().count() > MAX_PROMPT_CHARS {
            fields.insert("prompt", format!("Prompt cannot exceed {MAX_PROMPT_CHARS} characters"));
        }

        if language.trim().is_empty() {
            fields.insert("language", "Programming language must be specified".to_string());
        } else if language.chars().count() > MAX_LANGUAGE_CHARS {
            fields.insert(
                "language",
                format!("Language name cannot exceed {MAX_LANGUAGE_CHARS} characters"),
            );
        }

        if fields.is_empty() { Ok(Self { prompt, language }) } else { Err(ValidationError { fields }) }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl TryFrom<GenerationInput> for GenerationRequest {
    type Error = ValidationError;

    fn try_from(input: GenerationInput) -> Result<Self, Self::Error> {
        Self::new(input.prompt, input.language)
    }
}

/// Why an attempt that reached the generation client did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error("Gemini API key not configured. Please set GEMINI_API_KEY environment variable.")]
    NotConfigured,

    #[error("Code generation failed: {0}")]
    ExternalService(String),

    #[error("Generated code is empty or invalid")]
    EmptyResult,
}

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Code(String),
    Error(String),
}

/// The result of one generation attempt
///
/// Exactly one of generated code and error message is present.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    result: Payload,
    prompt: String,
    language: String,
    timestamp: DateTime<Utc>,
    execution_time_ms: u64,
}

impl GenerationOutcome {
    pub fn success(
        code: impl Into<String>,
        prompt: impl Into<String>,
        language: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            result: Payload::Code(code.into()),
            prompt: prompt.into(),
            language: language.into(),
            timestamp: Utc::now(),
            execution_time_ms,
        }
    }

    pub fn failure(
        error_message: impl Into<String>,
        prompt: impl Into<String>,
        language: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            result: Payload::Error(error_message.into()),
            prompt: prompt.into(),
            language: language.into(),
            timestamp: Utc::now(),
            execution_time_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, Payload::Code(_))
    }

    pub fn generated_code(&self) -> Option<&str> {
        match &self.result {
            Payload::Code(code) => Some(code),
            Payload::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.result {
            Payload::Code(_) => None,
            Payload::Error(message) => Some(message),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn execution_time_ms(&self) -> u64 {
        self.execution_time_ms
    }

    /// Ledger form of this outcome
    pub fn to_history_record(&self) -> NewHistoryRecord {
        NewHistoryRecord {
            user_prompt: self.prompt.clone(),
            programming_language: self.language.clone(),
            generated_code: self.generated_code().map(str::to_string),
            execution_time_ms: self.execution_time_ms,
            success: self.is_success(),
            error_message: self.error_message().map(str::to_string),
        }
    }
}

/// Wire form of an outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeBody {
    pub generated_code: Option<String>,
    pub prompt: String,
    pub language: String,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

impl From<&GenerationOutcome> for OutcomeBody {
    fn from(outcome: &GenerationOutcome) -> Self {
        Self {
            generated_code: outcome.generated_code().map(str::to_string),
            prompt: outcome.prompt.clone(),
            language: outcome.language.clone(),
            timestamp: outcome.timestamp,
            execution_time_ms: outcome.execution_time_ms,
            success: outcome.is_success(),
            error_message: outcome.error_message().map(str::to_string),
        }
    }
}

impl Serialize for GenerationOutcome {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        OutcomeBody::from(self).serialize(serializer)
    }
}
