/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Succeeds, tagging each string with the target language
 * - `MockProvider::echo()` - Returns every string unchanged
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::short_batch()` - Returns one fewer translation than requested
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Succeeds with `lang: text` for each string
    Working,
    /// Succeeds, returning each string unchanged
    Echo,
    /// Always fails with a server error
    Failing,
    /// Succeeds but drops the last translation from the batch
    ShortBatch,
}

/// Mock provider for testing translation behavior
///
/// Clones share the same counters, so a test can keep a handle while the
/// engine owns the boxed provider.
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Number of translate_batch calls
    call_count: Arc<AtomicUsize>,
    /// Size of each submitted batch, in call order
    batch_sizes: Arc<Mutex<Vec<usize>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            batch_sizes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that tags translations with the target language
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that returns every string unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns one fewer translation than requested
    pub fn short_batch() -> Self {
        Self::new(MockBehavior::ShortBatch)
    }

    /// Number of translate_batch calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Sizes of the batches submitted so far, in call order
    pub fn batch_sizes(&self) -> Vec<usize> {
        match self.batch_sizes.lock() {
            Ok(sizes) => sizes.clone(),
            Err(_) => Vec::new(),
        }
    }
}

/// The translation the working mock produces for a string.
///
/// The tag contains no markdown-special characters, so tagged strings
/// survive a serialize/parse round trip unescaped.
pub fn expected_translation(text: &str, target_language: &str) -> String {
    format!("{}: {}", target_language, text)
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            call_count: Arc::clone(&self.call_count),
            batch_sizes: Arc::clone(&self.batch_sizes),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate_batch(
        &self,
        texts: &[String],
        _source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut sizes) = self.batch_sizes.lock() {
            sizes.push(texts.len());
        }

        match self.behavior {
            MockBehavior::Working => Ok(texts
                .iter()
                .map(|text| expected_translation(text, target_language))
                .collect()),

            MockBehavior::Echo => Ok(texts.to_vec()),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::ShortBatch => {
                let mut translations: Vec<String> = texts
                    .iter()
                    .map(|text| expected_translation(text, target_language))
                    .collect();
                translations.pop();
                Ok(translations)
            }
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated connection failure".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
