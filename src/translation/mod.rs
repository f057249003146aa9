/*!
 * Translation pipeline built on the memory store and the providers.
 *
 * This module contains the run-level translation machinery, split into
 * two submodules:
 *
 * - `engine`: Memory-backed batch engine dispatching misses to a provider
 * - `postprocess`: Cosmetic polish pass for serialized markdown
 */

// Re-export main types for easier usage
pub use self::engine::{EngineOptions, TranslationEngine, TranslationMode};
pub use self::postprocess::MarkdownPolisher;

// Submodules
pub mod engine;
pub mod postprocess;
