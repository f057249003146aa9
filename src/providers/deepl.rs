/*!
 * DeepL translation API client.
 *
 * Speaks the v2 REST API. Free-tier keys carry a `:fx` suffix and are routed
 * to the free endpoint automatically; an explicit endpoint in the
 * configuration overrides that detection. Batches are submitted with HTML tag
 * handling enabled and sentence splitting disabled across newlines so
 * markdown fragments survive translation intact.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils::primary_subtag;
use crate::providers::Provider;

/// Endpoint for free-tier keys (suffix `:fx`)
const FREE_API_URL: &str = "https://api-free.deepl.com/v2";

/// Endpoint for pro keys
const PRO_API_URL: &str = "https://api.deepl.com/v2";

/// DeepL API client
#[derive(Debug, Clone)]
pub struct DeepLClient {
    /// API authentication key
    api_key: String,
    /// Base URL of the API (without trailing slash)
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Translate request body for the DeepL API
#[derive(Debug, Serialize)]
struct TranslateRequest {
    /// Strings to translate, in order
    text: Vec<String>,
    /// Source language (primary subtag, uppercased)
    source_lang: String,
    /// Target language code, uppercased
    target_lang: String,
    /// Treat embedded markup literally
    tag_handling: String,
    /// Never split sentences across newlines
    split_sentences: String,
}

/// Translate response from the DeepL API
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

/// One translated string in a response
#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

/// Usage response from the DeepL API
#[derive(Debug, Deserialize)]
struct UsageResponse {
    character_count: u64,
    character_limit: u64,
}

impl DeepLClient {
    /// Create a new DeepL client
    ///
    /// When no endpoint is given, the key suffix decides between the free
    /// and pro API hosts.
    pub fn new(api_key: impl Into<String>, endpoint: Option<String>, timeout_secs: u64) -> Self {
        let api_key = api_key.into();

        let base_url = match endpoint {
            Some(url) if !url.is_empty() => url,
            _ => {
                if api_key.ends_with(":fx") {
                    FREE_API_URL.to_string()
                } else {
                    PRO_API_URL.to_string()
                }
            }
        };

        Self {
            api_key,
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }
}

#[async_trait]
impl Provider for DeepLClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/translate", self.base_url);

        // DeepL accepts regional variants for targets (PT-BR) but only the
        // primary subtag for sources
        let request = TranslateRequest {
            text: texts.to_vec(),
            source_lang: primary_subtag(source_language).to_uppercase(),
            target_lang: target_language.to_uppercase(),
            tag_handling: "html".to_string(),
            split_sentences: "nonewlines".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ConnectionError(format!("Failed to reach DeepL API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            error!("DeepL API error ({}): {}", status, message);

            return Err(match status.as_u16() {
                // DeepL-specific status for an exhausted character quota
                456 => ProviderError::QuotaExceeded(format!(
                    "DeepL character quota exhausted: {}",
                    message
                )),
                429 => ProviderError::RateLimitExceeded(message),
                401 | 403 => ProviderError::AuthenticationError(format!(
                    "DeepL rejected the API key: {}",
                    message
                )),
                code => ProviderError::ApiError {
                    status_code: code,
                    message,
                },
            });
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            ProviderError::ParseError(format!("Failed to parse DeepL response: {}", e))
        })?;

        if parsed.translations.len() != texts.len() {
            return Err(ProviderError::BatchShapeMismatch {
                expected: texts.len(),
                actual: parsed.translations.len(),
            });
        }

        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/usage", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| {
                ProviderError::ConnectionError(format!("Failed to reach DeepL API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthenticationError(format!(
                    "DeepL rejected the API key: {}",
                    message
                )),
                code => ProviderError::ApiError {
                    status_code: code,
                    message,
                },
            });
        }

        let usage: UsageResponse = response.json().await.map_err(|e| {
            ProviderError::ParseError(format!("Failed to parse DeepL usage response: {}", e))
        })?;

        debug!(
            "DeepL usage: {}/{} characters",
            usage.character_count, usage.character_limit
        );

        Ok(())
    }

    fn name(&self) -> &str {
        "DeepL"
    }
}
