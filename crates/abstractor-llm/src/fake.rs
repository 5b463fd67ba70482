//! Scripted generation backend for tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

use crate::backend::{GenerationBackend, GenerationFailure, GenerationReply, GenerationRequest};

/// A configurable response for [`FakeBackend`].
#[derive(Clone, Debug)]
pub enum FakeResponse {
    /// Output already decoded.
    Structured(Value),
    /// Raw text the generator must parse.
    Text(String),
    /// A categorized failure.
    Fail(GenerationFailure),
}

/// A hand-rolled [`GenerationBackend`] that replays scripted responses.
///
/// Supports a fixed response or a sequence (one per call, repeating the last
/// once exhausted), call counting, and capture of every submitted request.
pub struct FakeBackend {
    responses: Mutex<Vec<FakeResponse>>,
    fallback: FakeResponse,
    requests: Mutex<Vec<GenerationRequest>>,
    call_count: AtomicUsize,
}

impl FakeBackend {
    /// A backend that always answers with `response`.
    pub fn new(response: FakeResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// A backend that answers in order, repeating the last response.
    pub fn with_sequence(mut responses: Vec<FakeResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        responses.reverse();
        let fallback = responses[0].clone();
        Self {
            responses: Mutex::new(responses),
            fallback,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `generate()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn next_response(&self) -> FakeResponse {
        match self.responses.lock() {
            Ok(mut seq) => seq.pop().unwrap_or_else(|| self.fallback.clone()),
            Err(_) => self.fallback.clone(),
        }
    }
}

impl GenerationBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationReply, GenerationFailure>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        let response = self.next_response();

        Box::pin(async move {
            match response {
                FakeResponse::Structured(value) => Ok(GenerationReply::Structured(value)),
                FakeResponse::Text(text) => Ok(GenerationReply::Text(text)),
                FakeResponse::Fail(failure) => Err(failure),
            }
        })
    }
}
