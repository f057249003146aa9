/*!
 * Batch translation engine backed by the translation memory.
 *
 * The engine owns the provider and the memory store for one run. Each call
 * to `translate` scans the extracted strings per target language: depending
 * on the mode, strings are served from the memory, buffered for the
 * provider, or both. Buffered misses remember their slot in the output so
 * results come back in input order regardless of batching.
 */

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};

use crate::app_config::Config;
use crate::errors::ProviderError;
use crate::memory::{MemoryStats, SqliteMemory, TranslationStore};
use crate::providers::{create_provider, Provider};

/// Where translations come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationMode {
    /// Memory only; misses fall back to the source string
    Offline,
    /// Provider only; the memory is not consulted
    Online,
    /// Memory first, provider for the misses
    #[default]
    Hybrid,
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Offline => "offline",
            Self::Online => "online",
            Self::Hybrid => "hybrid",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TranslationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "offline" => Ok(Self::Offline),
            "online" => Ok(Self::Online),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(anyhow!("Invalid translation mode: {}", s)),
        }
    }
}

/// Settings fixed at engine construction
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Language the extracted strings are written in
    pub source_language: String,

    /// Translation mode for the whole run
    pub mode: TranslationMode,

    /// Number of buffered misses that triggers a provider call
    pub batch_size: usize,

    /// Persist fresh remote translations into the memory
    pub memorize: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            mode: TranslationMode::default(),
            batch_size: 10,
            memorize: true,
        }
    }
}

impl EngineOptions {
    /// Derive engine options from the application configuration
    pub fn from_config(config: &Config, mode: TranslationMode) -> Self {
        Self {
            source_language: config.source_language.clone(),
            mode,
            batch_size: config.translation.common.batch_size.max(1),
            memorize: config.memory.memorize,
        }
    }
}

/// A memory miss waiting for the provider, remembering the output slot
/// it must fill
#[derive(Debug, Clone)]
struct PendingString {
    index: usize,
    text: String,
}

/// Translation engine for one run
#[derive(Debug)]
pub struct TranslationEngine {
    provider: Option<Box<dyn Provider>>,
    memory: Arc<dyn TranslationStore>,
    options: EngineOptions,
}

impl TranslationEngine {
    /// Create an engine with an explicit provider and store
    pub fn new(
        provider: Option<Box<dyn Provider>>,
        memory: Arc<dyn TranslationStore>,
        options: EngineOptions,
    ) -> Self {
        Self {
            provider,
            memory,
            options,
        }
    }

    /// Build an engine from the application configuration.
    ///
    /// Opens the memory store and, unless the mode is offline, constructs
    /// the configured provider. A provider that requires an API key fails
    /// here rather than midway through a run.
    pub fn from_config(config: &Config, mode: TranslationMode) -> Result<Self> {
        let provider = match mode {
            TranslationMode::Offline => None,
            TranslationMode::Online | TranslationMode::Hybrid => Some(create_provider(config)?),
        };

        let memory = SqliteMemory::open(&config.memory.path)?;

        match &provider {
            Some(active) => info!(
                "Translation engine ready ({} mode, {} provider)",
                mode,
                active.name()
            ),
            None => info!("Translation engine ready ({} mode)", mode),
        }

        Ok(Self::new(
            provider,
            Arc::new(memory),
            EngineOptions::from_config(config, mode),
        ))
    }

    /// Mode the engine was constructed with
    pub fn mode(&self) -> TranslationMode {
        self.options.mode
    }

    /// Verify the provider is reachable before starting a run.
    /// Offline engines have nothing to probe.
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            Some(provider) => provider.test_connection().await,
            None => Ok(()),
        }
    }

    /// Snapshot of the backing memory store
    pub async fn memory_stats(&self) -> Result<MemoryStats> {
        self.memory.stats().await
    }

    /// Translate `strings` into every language in `target_languages`.
    ///
    /// The result maps each target language to a translation list in input
    /// order. Duplicate inputs are translated independently; the scan does
    /// not deduplicate.
    pub async fn translate(
        &self,
        strings: &[String],
        target_languages: &[String],
    ) -> Result<HashMap<String, Vec<String>>> {
        let mut results = HashMap::new();

        for language in target_languages {
            let translations = self.translate_into(strings, language).await?;
            results.insert(language.clone(), translations);
        }

        Ok(results)
    }

    async fn translate_into(&self, strings: &[String], language: &str) -> Result<Vec<String>> {
        match self.options.mode {
            TranslationMode::Offline => self.translate_offline(strings, language).await,
            TranslationMode::Online => self.translate_online(strings, language).await,
            TranslationMode::Hybrid => self.translate_hybrid(strings, language).await,
        }
    }

    /// Serve everything from the memory; misses keep the source text
    async fn translate_offline(&self, strings: &[String], language: &str) -> Result<Vec<String>> {
        let mut translations = Vec::with_capacity(strings.len());
        let mut misses = 0usize;

        for text in strings {
            match self.memory.get(text, language).await? {
                Some(stored) => translations.push(stored),
                None => {
                    misses += 1;
                    translations.push(text.clone());
                }
            }
        }

        if misses > 0 {
            warn!(
                "{} of {} strings missing from memory for {}; kept the source text",
                misses,
                strings.len(),
                language
            );
        }

        Ok(translations)
    }

    /// Send everything to the provider, batch by batch
    async fn translate_online(&self, strings: &[String], language: &str) -> Result<Vec<String>> {
        let mut translations = vec![String::new(); strings.len()];
        let mut pending: Vec<PendingString> = Vec::new();

        for (index, text) in strings.iter().enumerate() {
            pending.push(PendingString {
                index,
                text: text.clone(),
            });

            if pending.len() >= self.options.batch_size {
                self.flush_batch(&mut pending, &mut translations, language)
                    .await?;
            }
        }

        if !pending.is_empty() {
            self.flush_batch(&mut pending, &mut translations, language)
                .await?;
        }

        Ok(translations)
    }

    /// Serve hits from the memory and buffer the misses for the provider
    async fn translate_hybrid(&self, strings: &[String], language: &str) -> Result<Vec<String>> {
        let mut translations = vec![String::new(); strings.len()];
        let mut pending: Vec<PendingString> = Vec::new();
        let mut hits = 0usize;

        for (index, text) in strings.iter().enumerate() {
            match self.memory.get(text, language).await? {
                Some(stored) => {
                    hits += 1;
                    translations[index] = stored;
                }
                None => {
                    pending.push(PendingString {
                        index,
                        text: text.clone(),
                    });

                    if pending.len() >= self.options.batch_size {
                        self.flush_batch(&mut pending, &mut translations, language)
                            .await?;
                    }
                }
            }
        }

        if !pending.is_empty() {
            self.flush_batch(&mut pending, &mut translations, language)
                .await?;
        }

        if hits > 0 {
            debug!(
                "{} of {} strings served from memory for {}",
                hits,
                strings.len(),
                language
            );
        }

        Ok(translations)
    }

    /// Send the buffered misses to the provider and write the results into
    /// their reserved slots
    async fn flush_batch(
        &self,
        pending: &mut Vec<PendingString>,
        translations: &mut [String],
        language: &str,
    ) -> Result<()> {
        let provider = self
            .provider
            .as_ref()
            .context("No provider configured for remote translation")?;

        let texts: Vec<String> = pending.iter().map(|entry| entry.text.clone()).collect();
        debug!(
            "Flushing batch of {} strings to {} for {}",
            texts.len(),
            provider.name(),
            language
        );

        let translated = provider
            .translate_batch(&texts, &self.options.source_language, language)
            .await?;

        if translated.len() != texts.len() {
            return Err(ProviderError::BatchShapeMismatch {
                expected: texts.len(),
                actual: translated.len(),
            }
            .into());
        }

        for (entry, translation) in pending.drain(..).zip(translated) {
            if self.options.memorize {
                self.memory.set(&entry.text, language, &translation).await?;
            }
            translations[entry.index] = translation;
        }

        Ok(())
    }
}
