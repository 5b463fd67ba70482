//! Schema-constrained summary generation.
//!
//! [`Generator`] builds the request for one document, sends it through a
//! [`GenerationBackend`], and walks the fallback chain down to the empty
//! payload when the backend is unavailable. [`OpenAiBackend`] talks to any
//! OpenAI-compatible chat-completions endpoint.

pub mod backend;
pub mod config;
pub mod fake;
pub mod generator;
pub mod openai;
pub mod prompt;
pub mod schema;

pub use backend::{GenerationBackend, GenerationFailure, GenerationReply, GenerationRequest};
pub use config::GenerationConfig;
pub use generator::{DegradeReason, Generation, GenerationError, GenerationOutcome, Generator};
pub use openai::OpenAiBackend;
pub use schema::{GeneratedSummary, SchemaError, mock_payload, summary_schema, validate_payload};
