/*!
 * Structured document adapters for translation.
 *
 * An adapter converts a parsed document into an ordered list of
 * translatable strings and later rebuilds the document from a
 * same-length, same-order list of translations. Extraction and
 * replacement share one traversal per format, so the i-th extracted
 * string and the i-th consumed translation always refer to the same
 * leaf. Submodules:
 *
 * - `markdown`: markdown/MDX documents as pulldown-cmark event streams
 * - `data`: JSON and YAML value trees
 * - `ignore`: marker-delimited regions excluded from translation
 */

pub mod data;
pub mod ignore;
pub mod markdown;

// Re-export main types
pub use data::{JsonAdapter, JsonDocument, KeySelector, YamlAdapter, YamlDocument};
pub use ignore::{
    IGNORE_END_MARKER, IGNORE_START_MARKER, IgnoredRegion, restore_ignored_regions,
    strip_ignored_regions,
};
pub use markdown::{MarkdownAdapter, MarkdownDocument};

use crate::errors::DocumentError;

/// Extraction and replacement over one document format.
///
/// Implementations guarantee that `replace` visits translatable leaves in
/// the exact order `extract` emitted them; handing `replace` the list
/// returned by `extract` reproduces the document.
pub trait DocumentAdapter {
    /// Parsed document representation for this format
    type Document;

    /// Collect translatable strings in traversal order
    fn extract(&self, document: &Self::Document) -> Result<Vec<String>, DocumentError>;

    /// Rebuild the document, substituting the i-th translatable leaf with
    /// `translations[i]`
    fn replace(
        &self,
        document: &Self::Document,
        translations: &[String],
    ) -> Result<Self::Document, DocumentError>;
}
