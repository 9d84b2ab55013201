//! Completion client for the locally hosted model.
//!
//! `CompletionClient` is the seam between the agent loop and the model
//! host: `OllamaClient` speaks the Ollama HTTP API, and `StubLlm` replays
//! scripted completions for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use roster_core::config::LlmConfig;

use crate::error::AgentError;

/// Text-completion port used by the agent loop.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete a prompt, returning the model's full response text.
    async fn complete(&self, prompt: &str) -> Result<String, AgentError>;

    /// Check that the model host is reachable.
    async fn health_check(&self) -> Result<(), AgentError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for the Ollama HTTP API.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Sending completion request");

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Llm(format!(
                "unexpected status {}: {}",
                status, body
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("invalid response body: {}", e)))?;

        Ok(body.response)
    }

    /// Probe `/api/tags`, the endpoint Ollama serves as soon as it is up.
    async fn health_check(&self) -> Result<(), AgentError> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("service not reachable: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AgentError::Llm(format!(
                "unexpected status: {}",
                response.status()
            )))
        }
    }
}

/// Test double replaying scripted completions in order.
///
/// Once the script is exhausted, every further call returns an error so a
/// test that loops more than expected fails loudly.
pub struct StubLlm {
    responses: Mutex<VecDeque<String>>,
}

impl StubLlm {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }
}

#[async_trait]
impl CompletionClient for StubLlm {
    async fn complete(&self, _prompt: &str) -> Result<String, AgentError> {
        let mut responses = self
            .responses
            .lock()
            .map_err(|e| AgentError::Llm(format!("stub lock poisoned: {}", e)))?;
        responses
            .pop_front()
            .ok_or_else(|| AgentError::Llm("stub script exhausted".to_string()))
    }

    async fn health_check(&self) -> Result<(), AgentError> {
        Ok(())
    }
}
