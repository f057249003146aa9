/*!
 * Provider implementations for the supported translation services.
 *
 * This module contains client implementations for the remote providers:
 * - DeepL: dedicated machine translation API (free and pro endpoints)
 * - OpenAI: chat-completions API, also covering LM Studio's compatible server
 * - Ollama: local LLM server
 *
 * LLM-backed providers share a JSON batch protocol: the request carries the
 * source strings as a JSON array and the model must answer with a JSON object
 * `{"translations": [...]}` of identical length and order.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use url::Url;

use crate::app_config::{Config, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// Implementations must preserve the order and count of the submitted batch:
/// the i-th result is the translation of the i-th input string.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate a batch of strings into the target language
    ///
    /// # Arguments
    /// * `texts` - The strings to translate, in order
    /// * `source_language` - Language code of the source strings
    /// * `target_language` - Language code to translate into
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - Translations in input order, or an error
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Short provider name for logs and error messages
    fn name(&self) -> &str;
}

/// Build the provider selected in the configuration
///
/// Fails with `MissingApiKey` when the provider requires a credential and
/// neither the configuration nor the conventional environment variable
/// supplies one. This runs at engine construction, before any string is
/// processed.
pub fn create_provider(config: &Config) -> Result<Box<dyn Provider>, ProviderError> {
    let translation = &config.translation;
    let provider = translation.provider.clone();
    let model = translation.get_model();
    let endpoint = translation.get_endpoint();
    let timeout_secs = translation.get_timeout_secs();
    let common = &translation.common;

    let api_key = translation.resolve_api_key();
    if provider.requires_api_key() && api_key.is_empty() {
        return Err(ProviderError::MissingApiKey {
            provider: provider.display_name().to_string(),
            env_var: provider.api_key_env_var().unwrap_or_default().to_string(),
        });
    }

    match provider {
        TranslationProvider::DeepL => {
            let endpoint = if endpoint.is_empty() {
                None
            } else {
                Some(normalize_endpoint(&endpoint, &provider)?)
            };
            Ok(Box::new(deepl::DeepLClient::new(
                api_key,
                endpoint,
                timeout_secs,
            )))
        }
        TranslationProvider::OpenAI => {
            let endpoint = normalize_endpoint(&endpoint, &provider)?;
            Ok(Box::new(
                openai::OpenAiClient::new(
                    "OpenAI",
                    endpoint,
                    Some(api_key),
                    model,
                    common.system_prompt.clone(),
                    timeout_secs,
                )
                .temperature(common.temperature)
                .retries(common.retry_count, common.retry_backoff_ms)
                .rate_limit(translation.get_rate_limit())
                .json_mode(true),
            ))
        }
        TranslationProvider::LMStudio => {
            let endpoint = normalize_endpoint(&endpoint, &provider)?;
            let api_key = if api_key.is_empty() { None } else { Some(api_key) };
            Ok(Box::new(
                openai::OpenAiClient::new(
                    "LM Studio",
                    endpoint,
                    api_key,
                    model,
                    common.system_prompt.clone(),
                    timeout_secs,
                )
                .temperature(common.temperature)
                .retries(common.retry_count, common.retry_backoff_ms)
                .rate_limit(translation.get_rate_limit()),
            ))
        }
        TranslationProvider::Ollama => {
            let endpoint = normalize_endpoint(&endpoint, &provider)?;
            Ok(Box::new(
                ollama::OllamaClient::new(endpoint, model, common.system_prompt.clone(), timeout_secs)
                    .temperature(common.temperature)
                    .retries(common.retry_count, common.retry_backoff_ms),
            ))
        }
    }
}

/// Validate a configured endpoint and strip the trailing slash
fn normalize_endpoint(endpoint: &str, provider: &TranslationProvider) -> Result<String, ProviderError> {
    let url = Url::parse(endpoint).map_err(|e| {
        ProviderError::ConnectionError(format!(
            "Invalid {} endpoint {}: {}",
            provider.display_name(),
            endpoint,
            e
        ))
    })?;

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Substitute the language placeholders in an LLM system prompt template
///
/// Uses full language names when the codes resolve, since models follow
/// "French" more reliably than "fr".
pub(crate) fn render_system_prompt(
    template: &str,
    source_language: &str,
    target_language: &str,
) -> String {
    let source = crate::language_utils::get_language_name(source_language)
        .unwrap_or_else(|_| source_language.to_string());
    let target = crate::language_utils::get_language_name(target_language)
        .unwrap_or_else(|_| target_language.to_string());

    template
        .replace("{source_language}", &source)
        .replace("{target_language}", &target)
}

/// Parse an LLM batch response into the expected number of translations
///
/// Models occasionally wrap the JSON in a code fence; that wrapping is
/// stripped before parsing. The response must be a JSON object with a
/// `translations` array matching the submitted batch length.
pub(crate) fn parse_batch_response(
    raw: &str,
    expected: usize,
) -> Result<Vec<String>, ProviderError> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| ProviderError::ParseError(format!("Response is not valid JSON: {}", e)))?;

    let translations = value
        .get("translations")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            ProviderError::ParseError("Response is missing the translations array".to_string())
        })?;

    let texts: Vec<String> = translations
        .iter()
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
        .collect();

    if texts.len() != expected {
        return Err(ProviderError::BatchShapeMismatch {
            expected,
            actual: texts.len(),
        });
    }

    Ok(texts)
}

/// Strip a markdown code fence wrapping, if present
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        let rest = rest.strip_suffix("```").unwrap_or(rest);
        rest.trim()
    } else {
        trimmed
    }
}

pub mod deepl;
pub mod mock;
pub mod ollama;
pub mod openai;
