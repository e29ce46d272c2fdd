use crate::types::{PipelineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Trait over the LLM runtime: a prompt and model name in, generated text
/// out. The pipeline only ever talks to models through this seam.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_seconds: u64,
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1/chat/completions".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            timeout_seconds: 60,
        }
    }
}

/// Client for an OpenAI-compatible chat-completions endpoint, as exposed by
/// locally-hosted runtimes such as Ollama.
pub struct ChatCompletionsClient {
    config: LlmClientConfig,
    client: reqwest::Client,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let req_body = ChatRequest {
            model: model.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        debug!("Sending prompt to model {} ({} chars)", model, prompt.len());

        let response = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client
                .post(&self.config.endpoint)
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .map_err(|_| PipelineError::Llm(format!("Request to model {} timed out", model)))?
        .map_err(|e| PipelineError::Llm(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Llm(format!(
                "LLM API error {}: {}",
                status, body
            )));
        }

        let resp_body: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        let choice = resp_body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Llm("LLM response has no choices".to_string()))?;

        Ok(choice.message.content)
    }
}

// OpenAI-compatible request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Extract a JSON object from model output that may carry markdown fences
/// or preamble text around it.
pub fn extract_json(text: &str) -> Option<String> {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim().to_string());
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return Some(text[start..=end].to_string());
        }
    }

    None
}

/// Scripted LLM client for tests and local development: responses are
/// queued per model name, and every call is recorded.
pub struct MockLlmClient {
    responses: Mutex<HashMap<String, Vec<String>>>,
    failing_models: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            failing_models: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a canned response for a model; responses are consumed in
    /// order, and the last one repeats once the queue is drained.
    pub fn with_response(self, model: &str, response: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push(response.to_string());
        self
    }

    /// Make every call to a model fail.
    pub fn with_failure(self, model: &str) -> Self {
        self.failing_models.lock().unwrap().push(model.to_string());
        self
    }

    /// Number of calls made to a given model.
    pub fn call_count(&self, model: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m.as_str() == model)
            .count()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));

        if self
            .failing_models
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.as_str() == model)
        {
            return Err(PipelineError::Llm(format!(
                "Mock failure for model {}",
                model
            )));
        }

        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(model) {
            Some(queue) if !queue.is_empty() => {
                if queue.len() == 1 {
                    Ok(queue[0].clone())
                } else {
                    Ok(queue.remove(0))
                }
            }
            _ => Err(PipelineError::Llm(format!(
                "No scripted response for model {}",
                model
            ))),
        }
    }
}
