//! # transform: submitting item content for automated correction
//!
//! - [`TransformationClient`] wraps any [`CompletionService`], attaches the fixed system
//!   instruction to each request and turns every service error into
//!   [`TransformOutcome::Failure`]. Callers never see an error from this layer.
//! - [`OpenAiCompletionService`] is the networked implementation: a `reqwest` client
//!   against an OpenAI-compatible `/chat/completions` endpoint.
//!
//! Build one client per run and share it by reference; it holds the HTTP connection pool.

use crate::config::ServiceSettings;
use crate::contract::{CompletionService, ServiceError, TransformOutcome, TransformRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Sampling temperature for every request, pinned to the most deterministic setting.
pub const TEMPERATURE: f32 = 0.0;

pub struct TransformationClient<S> {
    service: S,
    instruction: String,
}

impl<S: CompletionService> TransformationClient<S> {
    /// Client using the built-in system instruction.
    pub fn new(service: S) -> Self {
        Self::with_instruction(service, crate::config::DEFAULT_SYSTEM_INSTRUCTION)
    }

    pub fn with_instruction(service: S, instruction: impl Into<String>) -> Self {
        Self {
            service,
            instruction: instruction.into(),
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// A fresh request pairing the system instruction with `content`.
    pub fn request_for(&self, content: &str) -> TransformRequest {
        TransformRequest {
            instruction: self.instruction.clone(),
            content: content.to_string(),
        }
    }

    pub async fn transform(&self, content: &str) -> TransformOutcome {
        let request = self.request_for(content);
        debug!(size = request.content.len(), "Submitting content for transformation");
        match self.service.complete(&request).await {
            Ok(text) => TransformOutcome::Success(text),
            Err(e) => {
                error!(error = %e, "An error occurred while transforming content");
                TransformOutcome::Failure(e.to_string())
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

fn build_chat_request<'a>(model: &'a str, request: &'a TransformRequest) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: [
            ChatMessage {
                role: "system",
                content: &request.instruction,
            },
            ChatMessage {
                role: "user",
                content: &request.content,
            },
        ],
        temperature: TEMPERATURE,
    }
}

fn extract_content(body: &str) -> Result<String, ServiceError> {
    let response: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ServiceError::EmptyResponse)
}

/// [`CompletionService`] speaking the OpenAI chat completions protocol.
pub struct OpenAiCompletionService {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiCompletionService {
    pub fn new(settings: &ServiceSettings, api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().build()?;
        let endpoint = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));
        info!(endpoint = %endpoint, model = %settings.model, "Initialised completion service");
        Ok(Self {
            http,
            endpoint,
            model: settings.model.clone(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionService {
    async fn complete(&self, request: &TransformRequest) -> Result<String, ServiceError> {
        let payload = build_chat_request(&self.model, request);
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        extract_content(&body)
    }
}
