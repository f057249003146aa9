/*!
 * Marker-delimited ignore regions.
 *
 * A region is delimited by literal HTML-comment markers. Before a
 * markdown document is parsed, the content between each marker pair is
 * stripped out and recorded; the markers themselves stay in the text so
 * they travel through parsing, translation and serialization as inert
 * HTML comments. After the translated document is serialized, the
 * recorded content is written back between the surviving marker pairs.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::DocumentError;

/// Literal marker opening an ignored region
pub const IGNORE_START_MARKER: &str = "<!-- yadtwai-ignore-start -->";

/// Literal marker closing an ignored region
pub const IGNORE_END_MARKER: &str = "<!-- yadtwai-ignore-end -->";

static START_MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*yadtwai-ignore-start\s*-->").unwrap());

static END_MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<!--\s*yadtwai-ignore-end\s*-->").unwrap());

/// One span of source text excluded from translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredRegion {
    /// Byte offset of the start marker in the original text
    pub start: usize,
    /// Literal content between the markers, reinserted verbatim
    pub content: String,
}

/// Strip the content of every ignored region, leaving the markers in place.
///
/// Returns the stripped text and the recorded regions in document order.
/// A start marker without a following end marker is a fatal input error.
pub fn strip_ignored_regions(
    text: &str,
) -> Result<(String, Vec<IgnoredRegion>), DocumentError> {
    let mut output = String::with_capacity(text.len());
    let mut regions = Vec::new();
    let mut cursor = 0;

    while let Some(start_marker) = START_MARKER_PATTERN.find_at(text, cursor) {
        let end_marker = END_MARKER_PATTERN
            .find_at(text, start_marker.end())
            .ok_or(DocumentError::UnmatchedIgnoreMarker {
                offset: start_marker.start(),
            })?;

        output.push_str(&text[cursor..start_marker.end()]);
        output.push_str(end_marker.as_str());
        regions.push(IgnoredRegion {
            start: start_marker.start(),
            content: text[start_marker.end()..end_marker.start()].to_string(),
        });
        cursor = end_marker.end();
    }

    output.push_str(&text[cursor..]);
    Ok((output, regions))
}

/// Reinsert recorded region content between surviving marker pairs.
///
/// Pairs are matched in document order and rewritten with canonical
/// marker text. If processing lost marker pairs, the leftover regions
/// are dropped with a warning; their content does not reappear.
pub fn restore_ignored_regions(text: &str, regions: &[IgnoredRegion]) -> String {
    if regions.is_empty() {
        return text.to_string();
    }

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut restored = 0;

    while restored < regions.len() {
        let Some(start_marker) = START_MARKER_PATTERN.find_at(text, cursor) else {
            break;
        };
        let Some(end_marker) = END_MARKER_PATTERN.find_at(text, start_marker.end()) else {
            break;
        };

        output.push_str(&text[cursor..start_marker.start()]);
        output.push_str(IGNORE_START_MARKER);
        output.push_str(&regions[restored].content);
        output.push_str(IGNORE_END_MARKER);
        cursor = end_marker.end();
        restored += 1;
    }

    output.push_str(&text[cursor..]);

    if restored < regions.len() {
        warn!(
            "{} ignored region(s) lost their markers during processing and were dropped",
            regions.len() - restored
        );
    }

    output
}
