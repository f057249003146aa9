/*!
 * # yadtwai - Yet Another Documentation Translator with AI
 *
 * A Rust library for translating structured documentation trees using AI.
 *
 * ## Features
 *
 * - Translate markdown, MDX, JSON and YAML documents
 * - Keep code blocks, links, JSX and front matter structure intact
 * - Translate using various AI providers:
 *   - DeepL API
 *   - OpenAI API
 *   - Ollama (local LLM)
 *   - LM Studio (local LLM)
 * - Persistent SQLite translation memory with offline, online and hybrid modes
 * - Batch processing for efficient translation
 * - Mirrored output trees per target language with incremental reruns
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Document parsing and string extraction:
 *   - `document::markdown`: Event-level markdown and MDX rewriting
 *   - `document::data`: JSON and YAML value translation
 *   - `document::ignore`: Ignore-marker handling for markdown
 * - `translation`: AI-powered translation services:
 *   - `translation::engine`: Translation engine and modes
 *   - `translation::postprocess`: Markdown output polishing
 * - `memory`: Persistent translation memory backed by SQLite
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for translation providers:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::ollama`: Ollama API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod document;
pub mod translation;
pub mod memory;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use document::{JsonDocument, MarkdownDocument, YamlDocument};
pub use translation::{TranslationEngine, TranslationMode};
pub use memory::{MemoryStats, SqliteMemory, TranslationStore};
pub use language_utils::{language_codes_match, validate_language_code, get_language_name};
pub use errors::{AppError, DocumentError, ProviderError, TranslationError};
