//! OpenAI-compatible chat-completions backend with `json_schema` output.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::{Value, json};

use crate::backend::{GenerationBackend, GenerationFailure, GenerationReply, GenerationRequest};
use crate::config::GenerationConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

pub struct OpenAiBackend {
    api_key: Option<String>,
    project: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            project: config.project.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Request body for `POST /chat/completions`.
pub fn request_body(request: &GenerationRequest) -> Value {
    let mut messages = vec![json!({"role": "system", "content": request.system})];
    if let Some(prompt) = &request.user_prompt {
        messages.push(json!({"role": "user", "content": prompt}));
    }
    messages.push(json!({"role": "user", "content": request.content}));

    let mut body = json!({
        "model": request.model,
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": request.schema_name,
                "schema": request.schema,
                "strict": true,
            },
        },
        "messages": messages,
    });
    if let Some(tokens) = request.max_completion_tokens {
        body["max_completion_tokens"] = json!(tokens);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

/// Map an HTTP error status and body to a categorized failure.
pub fn classify_status(status: u16, body: &Value) -> GenerationFailure {
    let message = body["error"]["message"]
        .as_str()
        .or_else(|| body["message"].as_str())
        .unwrap_or("unknown API error")
        .to_string();
    match status {
        400 => GenerationFailure::InvalidRequest(message),
        401 | 403 => GenerationFailure::Authentication(message),
        429 => GenerationFailure::RateLimited(message),
        _ => GenerationFailure::Api { status, message },
    }
}

/// Pull the assistant output out of a chat-completions response.
///
/// String content is returned as text; some compatible servers return the
/// decoded object directly, which is passed through as structured output.
/// A refusal or missing content reads as empty text.
pub fn read_reply(body: &Value) -> GenerationReply {
    let message = &body["choices"][0]["message"];
    match &message["content"] {
        Value::String(s) => GenerationReply::Text(s.clone()),
        Value::Object(_) => GenerationReply::Structured(message["content"].clone()),
        _ => {
            if let Some(refusal) = message["refusal"].as_str() {
                tracing::warn!(refusal, "model refused to answer");
            }
            GenerationReply::Text(String::new())
        }
    }
}

impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn generate<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<GenerationReply, GenerationFailure>> + Send + 'a>> {
        Box::pin(async move {
            let mut req = self
                .client
                .post(self.endpoint())
                .timeout(REQUEST_TIMEOUT)
                .json(&request_body(request));

            if let Some(ref key) = self.api_key {
                req = req.bearer_auth(key);
            }
            if let Some(ref project) = self.project {
                req = req.header("OpenAI-Project", project);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| GenerationFailure::Transport(e.to_string()))?;

            let status = resp.status();
            let text = resp
                .text()
                .await
                .map_err(|e| GenerationFailure::Transport(e.to_string()))?;
            let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

            if !status.is_success() {
                return Err(classify_status(status.as_u16(), &body));
            }
            if body.is_null() {
                tracing::warn!(
                    body = %text.chars().take(200).collect::<String>(),
                    "response body is not JSON"
                );
            }
            Ok(read_reply(&body))
        })
    }
}
