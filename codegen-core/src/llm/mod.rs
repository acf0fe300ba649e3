//! Generation client integration
//!
//! Turns a (prompt, language) pair into a single call to an external
//! text-generation endpoint and normalizes the returned text into code.

pub mod errors;
pub mod gemini;
pub mod normalize;

#[cfg(test)]
pub mod mock;

pub use errors::{LLMError, LLMResult};
pub use gemini::GeminiClient;
pub use normalize::{NO_CODE_PLACEHOLDER, clean_generated_code};

use async_trait::async_trait;

/// Common trait for text-generation backends
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Get the name of this client
    fn name(&self) -> &str;

    /// True iff an endpoint and a real credential are set
    fn is_configured(&self) -> bool;

    /// Generate cleaned code for `prompt` in `language`
    ///
    /// Callers validate the inputs first; this only fails on the external
    /// call itself.
    async fn generate(&self, prompt: &str, language: &str) -> LLMResult<String>;
}
