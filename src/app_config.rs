use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO, optional region suffix)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language codes (ISO, optional region suffix)
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Source discovery and output mapping
    #[serde(default)]
    pub files: FilesConfig,

    /// Markdown-specific settings
    #[serde(default)]
    pub markdown: MarkdownConfig,

    /// JSON/YAML key selection
    #[serde(default)]
    pub data: DataConfig,

    /// Translation memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL
    #[default]
    DeepL,
    // @provider: OpenAI
    OpenAI,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepL => "deepl".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Conventional environment variable consulted when the configured key is empty
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::DeepL => Some("DEEPL_AUTH_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }

    /// Whether the provider cannot operate without an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::DeepL | Self::OpenAI)
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name (unused by DeepL)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::DeepL => Self {
                provider_type: "deepl".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: String::new(),
                timeout_secs: default_timeout_secs(),
                rate_limit: None,
            },
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
                rate_limit: default_openai_rate_limit(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_ollama_timeout_secs(),
                rate_limit: None,
            },
            TranslationProvider::LMStudio => Self {
                provider_type: "lmstudio".to_string(),
                model: default_lmstudio_model(),
                api_key: String::new(),
                endpoint: default_lmstudio_endpoint(),
                timeout_secs: default_ollama_timeout_secs(),
                rate_limit: None,
            },
        }
    }
}

/// Source discovery and output mapping
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilesConfig {
    /// Root directory scanned for source documents
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Output directory pattern; every occurrence of `$langcode$` is
    /// replaced with the target language code
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory names skipped during discovery
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Copy files that are not translatable documents into each output tree
    #[serde(default)]
    pub copy_other_files: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            excluded_dirs: default_excluded_dirs(),
            copy_other_files: false,
        }
    }
}

/// Markdown-specific settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MarkdownConfig {
    /// Front-matter keys whose values are translated; an empty list leaves
    /// front matter untouched
    #[serde(default = "default_front_matter_keys")]
    pub front_matter_keys: Vec<String>,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            front_matter_keys: default_front_matter_keys(),
        }
    }
}

/// JSON/YAML key selection
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DataConfig {
    /// Translate every string value, ignoring the key list
    #[serde(default)]
    pub translate_all_strings: bool,

    /// Mapping keys whose values (including nested values) are translated
    #[serde(default = "default_data_keys")]
    pub keys: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            translate_all_strings: false,
            keys: default_data_keys(),
        }
    }
}

/// Translation memory settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MemoryConfig {
    /// Location of the per-project memory database
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,

    /// Persist fresh remote translations into the memory
    #[serde(default = "default_true")]
    pub memorize: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_memory_path(),
            memorize: true,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Number of cache misses buffered before a batch is flushed to the provider
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// System prompt template for LLM-backed providers
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests (LLM-backed providers only)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_languages() -> Vec<String> {
    vec!["fr".to_string()]
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_output_dir() -> String {
    "translated/$langcode$".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    vec!["node_modules".to_string(), ".git".to_string()]
}

fn default_front_matter_keys() -> Vec<String> {
    vec!["title".to_string(), "description".to_string()]
}

fn default_data_keys() -> Vec<String> {
    vec![
        "title".to_string(),
        "description".to_string(),
        "label".to_string(),
    ]
}

fn default_memory_path() -> PathBuf {
    PathBuf::from(".yadtwai/memory.db")
}

fn default_batch_size() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, multiplied by the attempt number
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_lmstudio_endpoint() -> String {
    // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
    "http://localhost:1234/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate each entry from {source_language} to {target_language}. Preserve markdown formatting, placeholders and inline markup exactly. Respond with a JSON object {\"translations\": [...]} holding one translation per entry, in the same order.".to_string()
}

fn default_openai_rate_limit() -> Option<u32> {
    Some(60) // 60 requests per minute by default
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for language in &self.target_languages {
            let _target_name = crate::language_utils::get_language_name(language)?;
        }

        if self.translation.common.batch_size == 0 {
            return Err(anyhow!("Batch size must be at least 1"));
        }

        // Multiple targets writing into one directory would overwrite each other
        if self.target_languages.len() > 1 && !self.files.output_dir.contains("$langcode$") {
            return Err(anyhow!(
                "Output directory must contain the $langcode$ placeholder when translating into multiple languages"
            ));
        }

        // Key presence is enforced at engine construction, where the mode is
        // known; offline runs are legal without one
        if self.translation.provider.requires_api_key()
            && self.translation.resolve_api_key().is_empty()
        {
            warn!(
                "No API key configured for {}; only offline mode will work",
                self.translation.provider.display_name()
            );
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_languages: default_target_languages(),
            files: FilesConfig::default(),
            markdown: MarkdownConfig::default(),
            data: DataConfig::default(),
            memory: MemoryConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get a specific provider configuration by type for testing
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            TranslationProvider::DeepL => String::new(),
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::LMStudio => default_lmstudio_model(),
        }
    }

    /// Get the configured API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Resolve the API key for the active provider, falling back to the
    /// provider's conventional environment variable
    pub fn resolve_api_key(&self) -> String {
        let configured = self.get_api_key();
        if !configured.is_empty() {
            return configured;
        }

        self.provider
            .api_key_env_var()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        // Default fallback based on provider type
        match self.provider {
            TranslationProvider::DeepL => String::new(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::LMStudio => default_lmstudio_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        default_timeout_secs()
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        if let Some(provider_config) = self.get_active_provider_config() {
            return provider_config.rate_limit;
        }

        match self.provider {
            TranslationProvider::OpenAI => default_openai_rate_limit(),
            _ => None,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: TranslationProvider::default(),
            available_providers: Vec::new(),
            common: TranslationCommonConfig::default(),
        };

        // Add default providers
        config.available_providers.push(ProviderConfig::new(TranslationProvider::DeepL));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::OpenAI));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::Ollama));
        config.available_providers.push(ProviderConfig::new(TranslationProvider::LMStudio));

        config
    }
}
