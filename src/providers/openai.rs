/*!
 * OpenAI chat-completions client.
 *
 * Also serves any OpenAI-compatible server; LM Studio runs through this
 * client with its local endpoint, no API key and JSON response mode turned
 * off. Transient failures (network errors, 5xx, 429) are retried with linear
 * backoff; other client errors are surfaced immediately.
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{parse_batch_response, render_system_prompt, Provider};

/// OpenAI-compatible chat client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    /// Display name ("OpenAI" or "LM Studio")
    name: String,
    /// Base URL of the API (without trailing slash), e.g. https://api.openai.com/v1
    endpoint: String,
    /// Bearer token; local servers run without one
    api_key: Option<String>,
    /// Model identifier
    model: String,
    /// System prompt template with language placeholders
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of retry attempts for transient failures
    max_retries: u32,
    /// Base backoff time in milliseconds, multiplied per attempt
    backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
    /// Whether to request the json_object response format
    json_mode: bool,
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

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model identifier
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Sampling temperature
    temperature: f32,
    /// Structured output hint, when the server supports it
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Response format constraint
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiClient {
    /// Create a new client for an OpenAI-compatible endpoint
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.3,
            max_retries: 3,
            backoff_base_ms: 1000,
            rate_limit: None,
            json_mode: false,
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

    /// Set an optional rate limit in requests per minute
    pub fn rate_limit(mut self, rate_limit: Option<u32>) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Request the json_object response format from the server
    pub fn json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    /// Send a chat request, retrying transient failures with linear backoff
    ///
    /// Returns the content of the first completion choice.
    async fn send_with_retry(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let mut attempt: u32 = 0;
        let mut last_error =
            ProviderError::RequestFailed(format!("{} request was never attempted", self.name));

        while attempt <= self.max_retries {
            if attempt > 0 {
                let backoff_ms = self.backoff_base_ms * u64::from(attempt);
                warn!(
                    "{} request failed, retrying in {} ms (attempt {}/{})",
                    self.name,
                    backoff_ms,
                    attempt + 1,
                    self.max_retries + 1
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            } else if let Some(rate_limit) = self.rate_limit {
                // Pace requests to stay under the per-minute cap
                let delay_ms = 60_000 / u64::from(rate_limit.max(1));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            attempt += 1;

            let mut builder = self.client.post(&url).json(request);
            if let Some(key) = &self.api_key {
                builder = builder.header("Authorization", format!("Bearer {}", key));
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let parsed: ChatResponse = response.json().await.map_err(|e| {
                            ProviderError::ParseError(format!(
                                "Failed to parse {} response: {}",
                                self.name, e
                            ))
                        })?;

                        return parsed
                            .choices
                            .into_iter()
                            .next()
                            .map(|choice| choice.message.content)
                            .ok_or_else(|| {
                                ProviderError::ParseError(format!(
                                    "{} response contained no choices",
                                    self.name
                                ))
                            });
                    }

                    let code = status.as_u16();
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error response".to_string());

                    if code == 429 || status.is_server_error() {
                        error!(
                            "{} API error ({}): {} - attempt {}/{}",
                            self.name,
                            status,
                            message,
                            attempt,
                            self.max_retries + 1
                        );
                        last_error = if code == 429 {
                            ProviderError::RateLimitExceeded(message)
                        } else {
                            ProviderError::ApiError {
                                status_code: code,
                                message,
                            }
                        };
                    } else {
                        error!("{} API error ({}): {}", self.name, status, message);
                        return Err(match code {
                            401 | 403 => ProviderError::AuthenticationError(format!(
                                "{} rejected the API key: {}",
                                self.name, message
                            )),
                            _ => ProviderError::ApiError {
                                status_code: code,
                                message,
                            },
                        });
                    }
                }
                Err(e) => {
                    error!(
                        "{} network error: {} - attempt {}/{}",
                        self.name,
                        e,
                        attempt,
                        self.max_retries + 1
                    );
                    last_error = ProviderError::ConnectionError(format!(
                        "Failed to reach {}: {}",
                        self.name, e
                    ));
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl Provider for OpenAiClient {
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
            temperature: self.temperature,
            response_format: if self.json_mode {
                Some(ResponseFormat {
                    format_type: "json_object".to_string(),
                })
            } else {
                None
            },
        };

        let content = self.send_with_retry(&request).await?;
        parse_batch_response(&content, texts.len())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.endpoint);

        let mut builder = self.client.get(&url);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            ProviderError::ConnectionError(format!("Failed to reach {}: {}", self.name, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthenticationError(format!(
                    "{} rejected the API key: {}",
                    self.name, message
                )),
                code => ProviderError::ApiError {
                    status_code: code,
                    message,
                },
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
