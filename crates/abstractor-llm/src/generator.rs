//! Request building and the fallback chain around a [`GenerationBackend`].
//!
//! [`Generator::generate`] returns what the backend produced, or the empty
//! mock payload when generation is switched off, unauthorized, throttled,
//! or answered with nothing usable. Server and transport errors on the
//! first attempt, and payloads that do not have the summary shape, fail the
//! document.

use serde_json::Value;
use thiserror::Error;

use abstractor_core::{Metadata, SectionMap};

use crate::backend::{GenerationBackend, GenerationFailure, GenerationReply, GenerationRequest};
use crate::config::GenerationConfig;
use crate::prompt::{SYSTEM_INSTRUCTION, build_content_message, build_user_prompt};
use crate::schema::{
    GeneratedSummary, SCHEMA_NAME, SchemaError, mock_payload, normalize_payload_pages,
    summary_schema, validate_payload,
};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("LLM returned invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),
    #[error("failed to encode section content: {0}")]
    Content(#[from] serde_json::Error),
    #[error("generation request failed: {0}")]
    Backend(#[from] GenerationFailure),
}

/// Why a document got the mock payload instead of a generated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    OfflineOverride,
    MissingCredential,
    Authentication,
    RateLimited,
    EmptyResponse,
    UnparseableResponse,
    RetryFailed,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DegradeReason::OfflineOverride => "offline override",
            DegradeReason::MissingCredential => "no API key",
            DegradeReason::Authentication => "authentication failed",
            DegradeReason::RateLimited => "rate limited",
            DegradeReason::EmptyResponse => "empty response",
            DegradeReason::UnparseableResponse => "response was not JSON",
            DegradeReason::RetryFailed => "retry failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated,
    Degraded(DegradeReason),
}

/// Result of one generation: the validated summary plus the normalized raw
/// payload it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub summary: GeneratedSummary,
    pub raw: Value,
    pub outcome: GenerationOutcome,
}

/// Progress through the fallback chain.
///
/// `NotAttempted` → `Attempted` → (`Retried`) → `Degraded` | `Obtained`.
enum Stage {
    NotAttempted,
    Attempted(Result<GenerationReply, GenerationFailure>),
    Retried(Result<GenerationReply, GenerationFailure>),
    Degraded(DegradeReason),
    Obtained(Value),
}

pub struct Generator<B> {
    config: GenerationConfig,
    backend: B,
}

impl<B: GenerationBackend> Generator<B> {
    pub fn new(config: GenerationConfig, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Full request for one document.
    pub fn build_request(
        &self,
        metadata: &Metadata,
        sections: &SectionMap,
    ) -> Result<GenerationRequest, GenerationError> {
        Ok(GenerationRequest {
            model: self.config.model.clone(),
            system: SYSTEM_INSTRUCTION.to_string(),
            user_prompt: Some(build_user_prompt(metadata, sections)),
            content: build_content_message(sections)?,
            schema_name: SCHEMA_NAME.to_string(),
            schema: summary_schema(),
            temperature: self.config.temperature,
            max_completion_tokens: self.config.max_completion_tokens,
        })
    }

    /// Produce a summary payload for one document.
    pub async fn generate(
        &self,
        metadata: &Metadata,
        sections: &SectionMap,
    ) -> Result<Generation, GenerationError> {
        let request = self.build_request(metadata, sections)?;

        let mut stage = Stage::NotAttempted;
        let (mut raw, outcome) = loop {
            stage = match stage {
                Stage::NotAttempted => {
                    if self.config.force_mock {
                        Stage::Degraded(DegradeReason::OfflineOverride)
                    } else if !self.config.has_credential() {
                        Stage::Degraded(DegradeReason::MissingCredential)
                    } else {
                        tracing::debug!(
                            backend = self.backend.name(),
                            model = %request.model,
                            "requesting summary"
                        );
                        Stage::Attempted(self.backend.generate(&request).await)
                    }
                }
                Stage::Attempted(Ok(reply)) | Stage::Retried(Ok(reply)) => {
                    match decode_reply(reply) {
                        Ok(value) => Stage::Obtained(value),
                        Err(reason) => Stage::Degraded(reason),
                    }
                }
                Stage::Attempted(Err(GenerationFailure::InvalidRequest(message))) => {
                    tracing::warn!(
                        error = %message,
                        "request rejected, retrying with minimal parameters"
                    );
                    let reduced = request.reduced();
                    Stage::Retried(self.backend.generate(&reduced).await)
                }
                Stage::Attempted(Err(GenerationFailure::Authentication(message))) => {
                    tracing::warn!(error = %message, "authentication failed");
                    Stage::Degraded(DegradeReason::Authentication)
                }
                Stage::Attempted(Err(GenerationFailure::RateLimited(message))) => {
                    tracing::warn!(error = %message, "rate limited");
                    Stage::Degraded(DegradeReason::RateLimited)
                }
                Stage::Attempted(Err(failure)) => return Err(GenerationError::Backend(failure)),
                Stage::Retried(Err(failure)) => {
                    tracing::warn!(error = %failure, "retry failed");
                    Stage::Degraded(DegradeReason::RetryFailed)
                }
                Stage::Degraded(reason) => {
                    tracing::warn!(reason = %reason, "using empty summary payload");
                    break (mock_payload(metadata), GenerationOutcome::Degraded(reason));
                }
                Stage::Obtained(value) => break (value, GenerationOutcome::Generated),
            };
        };

        normalize_payload_pages(&mut raw);
        let summary = validate_payload(&raw)?;
        Ok(Generation {
            summary,
            raw,
            outcome,
        })
    }
}

fn decode_reply(reply: GenerationReply) -> Result<Value, DegradeReason> {
    match reply {
        GenerationReply::Structured(value) => Ok(value),
        GenerationReply::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(DegradeReason::EmptyResponse);
            }
            serde_json::from_str(text).map_err(|e| {
                tracing::warn!(error = %e, "could not parse response as JSON");
                DegradeReason::UnparseableResponse
            })
        }
    }
}
