// src/services/llm_service.rs
use crate::errors::AuraError;
use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub body: String,
}

/// No response was received at all.
#[derive(Debug, thiserror::Error)]
#[error("Network error: {0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn send(&self, request: &CompletionRequest) -> Result<GatewayResponse, TransportError>;
}

/// OpenAI-compatible chat completions gateway.
pub struct GatewayClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GatewayClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl GenerationClient for GatewayClient {
    async fn send(&self, request: &CompletionRequest) -> Result<GatewayResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": request.model,
                "messages": [{ "role": "user", "content": request.prompt }],
                "max_tokens": request.max_tokens,
                "temperature": request.temperature,
            }))
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("Failed to read gateway body: {}", e)))?;

        Ok(GatewayResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug)]
pub enum AttemptOutcome {
    Completed(String),
    Retryable(String),
    Terminal(AuraError),
}

#[derive(Debug)]
pub enum RetryState {
    Idle,
    Attempting { attempt: u32 },
    Retrying { attempt: u32, last_error: String },
    Success(String),
    Failed(AuraError),
}

impl RetryState {
    pub fn after_attempt(attempt: u32, outcome: AttemptOutcome, policy: &RetryPolicy) -> Self {
        match outcome {
            AttemptOutcome::Completed(text) => RetryState::Success(text),
            AttemptOutcome::Terminal(err) => RetryState::Failed(err),
            AttemptOutcome::Retryable(last_error) if attempt <= policy.max_retries => {
                RetryState::Retrying {
                    attempt,
                    last_error,
                }
            }
            AttemptOutcome::Retryable(last_error) => {
                RetryState::Failed(AuraError::ServiceUnavailable(last_error))
            }
        }
    }
}

pub fn classify(result: Result<GatewayResponse, TransportError>) -> AttemptOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => return AttemptOutcome::Retryable(e.to_string()),
    };

    match response.status {
        429 => return AttemptOutcome::Terminal(AuraError::RateLimited),
        402 => return AttemptOutcome::Terminal(AuraError::QuotaExceeded),
        200..=299 => {}
        status => {
            error!("AI gateway error: {} {}", status, response.body);
            return AttemptOutcome::Retryable(format!("AI Gateway error: {}", status));
        }
    }

    let data: Value = match serde_json::from_str(&response.body) {
        Ok(data) => data,
        Err(e) => return AttemptOutcome::Retryable(format!("Invalid gateway body: {}", e)),
    };

    let provider_error = &data["error"];
    let internal = provider_error["code"].as_i64() == Some(500)
        || provider_error["message"]
            .as_str()
            .is_some_and(|m| m.contains("Internal"));
    if internal {
        return AttemptOutcome::Retryable(format!(
            "AI Gateway internal error: {}",
            provider_error["message"].as_str().unwrap_or("unknown")
        ));
    }

    match data["choices"][0]["message"]["content"].as_str() {
        Some(content) => AttemptOutcome::Completed(content.to_string()),
        None => AttemptOutcome::Terminal(AuraError::MalformedResponse(
            "No content in AI response".to_string(),
        )),
    }
}

pub struct LLMService {
    client: Arc<dyn GenerationClient>,
    policy: RetryPolicy,
    model: String,
}

impl LLMService {
    pub const MAX_TOKENS: u32 = 4000;
    pub const TEMPERATURE: f32 = 0.75;

    pub fn new(client: Arc<dyn GenerationClient>, model: String, policy: RetryPolicy) -> Self {
        Self {
            client,
            policy,
            model,
        }
    }

    /// Returns the completion text. Attempts are strictly sequential.
    pub async fn generate(&self, prompt: String) -> Result<String, AuraError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt,
            max_tokens: Self::MAX_TOKENS,
            temperature: Self::TEMPERATURE,
        };

        let mut state = RetryState::Idle;
        loop {
            state = match state {
                RetryState::Idle => RetryState::Attempting { attempt: 1 },
                RetryState::Attempting { attempt } => {
                    let outcome = classify(self.client.send(&request).await);
                    RetryState::after_attempt(attempt, outcome, &self.policy)
                }
                RetryState::Retrying {
                    attempt,
                    last_error,
                } => {
                    warn!("AI Gateway attempt {} failed: {}", attempt, last_error);
                    tokio::time::sleep(self.policy.delay).await;
                    info!("AI Gateway retry attempt {}", attempt);
                    RetryState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                RetryState::Success(text) => return Ok(text),
                RetryState::Failed(err) => return Err(err),
            };
        }
    }
}
