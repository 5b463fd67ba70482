//! The text-generation capability as seen by the generator.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

/// One schema-constrained generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system: String,
    /// Metadata prompt listing the available sections. Dropped on retry.
    pub user_prompt: Option<String>,
    /// JSON-encoded section bodies and output instructions.
    pub content: String,
    pub schema_name: String,
    pub schema: Value,
    pub temperature: Option<f64>,
    pub max_completion_tokens: Option<u32>,
}

impl GenerationRequest {
    /// The request minus everything optional: no sampling temperature, no
    /// completion budget, no metadata prompt.
    pub fn reduced(&self) -> Self {
        Self {
            user_prompt: None,
            temperature: None,
            max_completion_tokens: None,
            ..self.clone()
        }
    }
}

/// What a backend hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationReply {
    /// Output already decoded into a JSON value.
    Structured(Value),
    /// Raw text that should parse as JSON.
    Text(String),
}

/// Categorized backend failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },
}

/// A text-generation service that can honor a JSON schema.
pub trait GenerationBackend: Send + Sync {
    /// Short name for logs (e.g., "OpenAI").
    fn name(&self) -> &str;

    /// Submit `request` and wait for the reply.
    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationReply, GenerationFailure>> + Send + 'a>>;
}
