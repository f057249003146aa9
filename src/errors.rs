/*!
 * Error types for the yadtwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Translation quota exhausted for the billing period
    #[error("Translation quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// No API key available for a provider that requires one
    #[error("Missing API key for provider '{provider}'; set it in the configuration or the {env_var} environment variable")]
    MissingApiKey {
        /// Provider display name
        provider: String,
        /// Conventional environment variable for the key
        env_var: String
    },

    /// Provider returned a batch of the wrong length
    #[error("Provider returned {actual} translations for a batch of {expected}")]
    BatchShapeMismatch {
        /// Number of strings submitted
        expected: usize,
        /// Number of translations received
        actual: usize
    },
}

/// Errors that can occur while extracting from or rebuilding a document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// An ignore-start marker with no matching end marker
    #[error("Ignore-region start marker at byte {offset} has no matching end marker")]
    UnmatchedIgnoreMarker {
        /// Byte offset of the unmatched start marker in the original text
        offset: usize
    },

    /// Replacement was handed a translation list of the wrong length
    #[error("Document has {expected} translatable strings but {actual} translations were supplied")]
    TranslationCountMismatch {
        /// Translatable leaves visited during replacement
        expected: usize,
        /// Length of the supplied translation list
        actual: usize
    },

    /// Source text could not be parsed into a document tree
    #[error("Failed to parse document: {0}")]
    ParseFailed(String),

    /// Rebuilt document could not be serialized back to text
    #[error("Failed to serialize document: {0}")]
    SerializeFailed(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document extraction or replacement
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the application configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document processing
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
