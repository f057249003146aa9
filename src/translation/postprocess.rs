/*!
 * Cosmetic polish for serialized markdown.
 *
 * The serializer and the translation round trip leave small artifacts behind:
 * star list markers, loosened lists, escaped punctuation inside translated
 * text, missing spacing after inline formatting. This module runs a fixed,
 * ordered rule table over the serialized document once per output file,
 * between serialization and ignored-region reinsertion. Pure text in,
 * text out.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered rewrite rules applied by `polish`
///
/// The list-tightening rules appear twice: gluing consecutive items consumes
/// the following marker, so alternating items need a second pass.
static POLISH_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // Normalize star list markers to dashes, at any nesting depth
        (Regex::new(r"(?m)^([ \t]*)\*([ \t])").unwrap(), "${1}-${2}"),
        // Tighten loosened unordered lists (two passes)
        (
            Regex::new(r"(?m)^([ \t]*- [^\n]*)\n\n([ \t]*- )").unwrap(),
            "${1}\n${2}",
        ),
        (
            Regex::new(r"(?m)^([ \t]*- [^\n]*)\n\n([ \t]*- )").unwrap(),
            "${1}\n${2}",
        ),
        // Tighten loosened ordered lists (two passes)
        (
            Regex::new(r"(?m)^([ \t]*[0-9]+\. [^\n]*)\n\n([ \t]*[0-9]+\. )").unwrap(),
            "${1}\n${2}",
        ),
        (
            Regex::new(r"(?m)^([ \t]*[0-9]+\. [^\n]*)\n\n([ \t]*[0-9]+\. )").unwrap(),
            "${1}\n${2}",
        ),
        // Attach a list to its introducing "Header:" line
        (
            Regex::new(r"(?m)^([^\n]*:)\n\n([ \t]*- )").unwrap(),
            "${1}\n${2}",
        ),
        // Blank line before a standalone image
        (
            Regex::new(r"(?m)([^\n])\n(!\[[^\n\]]*\]\([^()\n]+\))").unwrap(),
            "${1}\n\n${2}",
        ),
        // Blank line after a standalone image
        (
            Regex::new(r"(?m)^(!\[[^\n\]]*\]\([^()\n]+\))\n([^\n])").unwrap(),
            "${1}\n\n${2}",
        ),
        // Blank line before an img tag
        (
            Regex::new(r"(?m)([^\n])\n(<img[^\n]*/>)").unwrap(),
            "${1}\n\n${2}",
        ),
        // Blank line after an img tag
        (
            Regex::new(r"(?m)^(<img[^\n]*/>)\n([^\n])").unwrap(),
            "${1}\n\n${2}",
        ),
        // Blank line before a table header pair
        (
            Regex::new(r"(?m)([^\n|])\n(\|[^\n]*\|\n[ \t]*\|[ :\-|]+\|)").unwrap(),
            "${1}\n\n${2}",
        ),
        // Reopen iframes the serializer collapsed to self-closing tags
        (
            Regex::new(r#"(?m)^(<div class="video-container">\n[ \t]*)(<iframe[^\n]*)/>(\n</div>)"#)
                .unwrap(),
            "${1}${2}></iframe>${3}",
        ),
        // Drop stray whitespace before a tag's closing bracket
        (Regex::new(r"(<[^<>\n]*)[ \t]>").unwrap(), "${1}>"),
        // Unescape angle brackets around markup that came back escaped
        (Regex::new(r"\\<([A-Za-z/!])").unwrap(), "<${1}"),
        (Regex::new(r#"([A-Za-z"'/])\\>"#).unwrap(), "${1}>"),
        // Unescape bracketed list entries, task markers included
        (
            Regex::new(r"(?m)^([ \t]*- )\\\[([^\n\]]*\])").unwrap(),
            "${1}[${2}",
        ),
        // Unescape leading issue-number hashes
        (
            Regex::new(r"(?m)^([ \t]*(?:- )?)\\#([0-9])").unwrap(),
            "${1}#${2}",
        ),
        // Restore the space translations drop after inline formatting.
        // Two letters minimum so suffixes like "`String`s" stay attached.
        (
            Regex::new(r"(\]\([^()\s]+\))([A-Za-zÀ-ÿ]{2,})").unwrap(),
            "${1} ${2}",
        ),
        (
            Regex::new(r"(\*\*[^*\n]+\*\*)([A-Za-zÀ-ÿ]{2,})").unwrap(),
            "${1} ${2}",
        ),
        (
            Regex::new(r"(`[^`\n]+`)([A-Za-zÀ-ÿ]{2,})").unwrap(),
            "${1} ${2}",
        ),
        // Restore the space after an ordered list marker
        (
            Regex::new(r"(?m)^([ \t]*[0-9]+\.)([A-Za-zÀ-ÿ])").unwrap(),
            "${1} ${2}",
        ),
    ]
});

/// Markdown polisher applying the cosmetic rule table
pub struct MarkdownPolisher;

impl MarkdownPolisher {
    /// Apply all polish rules to a serialized markdown document
    pub fn polish(markdown: &str) -> String {
        let mut output = markdown.to_string();

        for (pattern, replacement) in POLISH_RULES.iter() {
            output = pattern.replace_all(&output, *replacement).into_owned();
        }

        output
    }
}
