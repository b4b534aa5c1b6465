//! Content generation
//!
//! The [`ContentGenerator`] trait is the seam the orchestrator depends on.
//! [`OpenAiGenerator`] is the production implementation talking to any
//! OpenAI-compatible chat completions endpoint.

pub mod openai;
pub mod prompt;

pub use openai::OpenAiGenerator;
pub use prompt::Prompt;

use crate::artifact::DraftRequest;
use crate::error::GenerationError;
use async_trait::async_trait;

/// Drafts free text from a structured request
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Produce non-empty text for `request`. Never retries.
    async fn generate(&self, request: &DraftRequest) -> Result<String, GenerationError>;

    /// Model identifier, for health reporting
    fn model_name(&self) -> &str;
}
