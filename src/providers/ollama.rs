/*!
 * Ollama client for local LLM translation.
 *
 * Talks to the /api/chat endpoint with streaming disabled and the JSON
 * output format requested, so responses arrive as a single object the batch
 * parser can consume. Transient failures are retried with linear backoff.
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{parse_batch_response, render_system_prompt, Provider};

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// Base URL of the Ollama server (without trailing slash)
    base_url: String,
    /// Model name to use for generation
    model: String,
    /// System prompt template with language placeholders
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of retry attempts for transient failures
    max_retries: u32,
    /// Base backoff time in milliseconds, multiplied per attempt
    backoff_base_ms: u64,
    /// HTTP client for making requests
    client: Client,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user, or assistant)
    role: String,
    /// Content of the message
    content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Whether to stream the response
    stream: bool,
    /// Format to return the response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

/// Model parameters for the Ollama API
#[derive(Debug, Serialize)]
struct ChatOptions {
    /// Sampling temperature
    temperature: f32,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Response message
    message: ChatMessage,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            base_url: endpoint.into(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.3,
            max_retries: 3,
            backoff_base_ms: 1000,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the retry policy for transient failures
    pub fn retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Send a chat request, retrying transient failures with linear backoff
    async fn send_with_retry(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let mut attempt: u32 = 0;
        let mut last_error =
            ProviderError::RequestFailed("Ollama request was never attempted".to_string());

        while attempt <= self.max_retries {
            if attempt > 0 {
                let backoff_ms = self.backoff_base_ms * u64::from(attempt);
                warn!(
                    "Ollama request failed, retrying in {} ms (attempt {}/{})",
                    backoff_ms,
                    attempt + 1,
                    self.max_retries + 1
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            attempt += 1;

            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: ChatResponse = response.json().await.map_err(|e| {
                            ProviderError::ParseError(format!(
                                "Failed to parse Ollama response: {}",
                                e
                            ))
                        })?;

                        return Ok(parsed.message.content);
                    }

                    let code = status.as_u16();
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error response".to_string());

                    if status.is_server_error() {
                        error!(
                            "Ollama API error ({}): {} - attempt {}/{}",
                            status,
                            message,
                            attempt,
                            self.max_retries + 1
                        );
                        last_error = ProviderError::ApiError {
                            status_code: code,
                            message,
                        };
                    } else {
                        error!("Ollama API error ({}): {}", status, message);
                        return Err(if code == 404 {
                            ProviderError::ApiError {
                                status_code: code,
                                message: format!(
                                    "Model {} not found. Pull it with: ollama pull {}",
                                    self.model, self.model
                                ),
                            }
                        } else {
                            ProviderError::ApiError {
                                status_code: code,
                                message,
                            }
                        });
                    }
                }
                Err(e) => {
                    error!(
                        "Ollama network error: {} - attempt {}/{}",
                        e,
                        attempt,
                        self.max_retries + 1
                    );
                    last_error = ProviderError::ConnectionError(format!(
                        "Failed to reach Ollama at {}: {}",
                        self.base_url, e
                    ));
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl Provider for OllamaClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let system = render_system_prompt(&self.system_prompt, source_language, target_language);
        let user = serde_json::to_string(texts).map_err(|e| {
            ProviderError::RequestFailed(format!("Failed to encode request batch: {}", e))
        })?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            stream: false,
            format: Some("json".to_string()),
            options: Some(ChatOptions {
                temperature: self.temperature,
            }),
        };

        let content = self.send_with_retry(&request).await?;
        parse_batch_response(&content, texts.len())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/version", self.base_url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            ProviderError::ConnectionError(format!(
                "Failed to reach Ollama at {}: {}",
                self.base_url, e
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let value: serde_json::Value = response.json().await.map_err(|e| {
            ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e))
        })?;

        if let Some(version) = value.get("version").and_then(|v| v.as_str()) {
            debug!("Connected to Ollama {}", version);
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
