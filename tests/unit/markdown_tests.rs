/*!
 * Tests for the markdown document adapter
 */

use yadtwai::document::{DocumentAdapter, MarkdownAdapter, MarkdownDocument};
use yadtwai::errors::DocumentError;

fn adapter() -> MarkdownAdapter {
    MarkdownAdapter::new(Vec::new())
}

fn front_matter_adapter(keys: &[&str]) -> MarkdownAdapter {
    MarkdownAdapter::new(keys.iter().map(|k| k.to_string()).collect())
}

/// Test that headings and paragraphs extract as separate runs
#[test]
fn test_extract_withHeadingAndParagraphs_shouldReturnOneRunPerBlock() {
    let document = MarkdownDocument::parse("# Welcome\n\nFirst paragraph.\n\nSecond one.\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Welcome", "First paragraph.", "Second one."]);
}

/// Test that inline formatting stays inside a single run
#[test]
fn test_extract_withEmphasis_shouldKeepFormattingInRun() {
    let document = MarkdownDocument::parse("Some **bold** and *italic* text.\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Some **bold** and *italic* text."]);
}

/// Test that links travel inside the run with their URL intact
#[test]
fn test_extract_withLink_shouldKeepUrlInRun() {
    let document =
        MarkdownDocument::parse("See [the docs](https://example.com/guide) here.\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(
        strings,
        vec!["See [the docs](https://example.com/guide) here."]
    );
}

/// Test that inline code breaks the run and is never extracted
#[test]
fn test_extract_withInlineCode_shouldBreakRunAroundCode() {
    let document = MarkdownDocument::parse("Run `cargo build` now.\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Run ", " now."]);
}

/// Test that code blocks are protected spans
#[test]
fn test_extract_withCodeBlock_shouldSkipItsContent() {
    let document =
        MarkdownDocument::parse("Intro.\n\n```rust\nlet x = 1;\n```\n\nOutro.\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Intro.", "Outro."]);
}

/// Test that a standalone image is fully protected, alt text included
#[test]
fn test_extract_withStandaloneImage_shouldExtractNothing() {
    let document = MarkdownDocument::parse("![Alt text](image.png)\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert!(strings.is_empty());
}

/// Test that an image embedded in a sentence stays inside the run
#[test]
fn test_extract_withInlineImage_shouldKeepImageInRun() {
    let document = MarkdownDocument::parse("Click ![icon](i.png) to start.\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Click ![icon](i.png) to start."]);
}

/// Test that inline HTML tags break runs and pass through
#[test]
fn test_extract_withInlineHtml_shouldBreakRunAroundTags() {
    let document = MarkdownDocument::parse("Press <kbd>Ctrl</kbd> now.\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Press ", "Ctrl", " now."]);
}

/// Test that an HTML block, as produced by JSX components, is protected
#[test]
fn test_extract_withHtmlBlock_shouldSkipItsContent() {
    let text = "<Callout type=\"info\">\n  Careful here.\n</Callout>\n\nAfter text.\n";
    let document = MarkdownDocument::parse(text);

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["After text."]);
}

/// Test that list items extract one run each
#[test]
fn test_extract_withList_shouldReturnOneRunPerItem() {
    let document = MarkdownDocument::parse("- First\n- Second\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["First", "Second"]);
}

/// Test that table cells extract one run each
#[test]
fn test_extract_withTable_shouldReturnOneRunPerCell() {
    let document =
        MarkdownDocument::parse("| Name | Role |\n| --- | --- |\n| Alice | Admin |\n");

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Name", "Role", "Alice", "Admin"]);
}

/// Test front matter values under configured keys are extracted
#[test]
fn test_extract_withFrontMatterKeys_shouldIncludeConfiguredValues() {
    let text = "---\ntitle: Getting started\ndraft: true\n---\n\n# Body\n";
    let document = MarkdownDocument::parse(text);

    let strings = front_matter_adapter(&["title"])
        .extract(&document)
        .expect("Extract failed");

    assert_eq!(strings, vec!["Getting started", "Body"]);
}

/// Test front matter passes through when no keys are configured
#[test]
fn test_extract_withoutFrontMatterKeys_shouldLeaveFrontMatterAlone() {
    let text = "---\ntitle: Getting started\n---\n\n# Body\n";
    let document = MarkdownDocument::parse(text);

    let strings = adapter().extract(&document).expect("Extract failed");

    assert_eq!(strings, vec!["Body"]);
}

/// Test replacement rewrites runs while protecting code and links
#[test]
fn test_replace_withTranslations_shouldRewriteRunsOnly() {
    let text = "# Welcome\n\nSee [the docs](https://example.com/guide) here.\n";
    let document = MarkdownDocument::parse(text);
    let adapter = adapter();

    let translations = vec![
        "Bienvenue".to_string(),
        "Voir [les docs](https://example.com/guide) ici.".to_string(),
    ];
    let rebuilt = adapter
        .replace(&document, &translations)
        .expect("Replace failed");
    let markdown = rebuilt.to_markdown().expect("Serialize failed");

    assert!(markdown.contains("# Bienvenue"));
    assert!(markdown.contains("[les docs](https://example.com/guide)"));
    assert!(!markdown.contains("Welcome"));
}

/// Test replacement keeps code blocks byte-identical
#[test]
fn test_replace_withCodeBlock_shouldKeepCodeVerbatim() {
    let text = "Intro.\n\n```rust\nlet x = 1;\n```\n\nOutro.\n";
    let document = MarkdownDocument::parse(text);
    let adapter = adapter();

    let rebuilt = adapter
        .replace(&document, &["Début.".to_string(), "Fin.".to_string()])
        .expect("Replace failed");
    let markdown = rebuilt.to_markdown().expect("Serialize failed");

    assert!(markdown.contains("let x = 1;"));
    assert!(markdown.contains("Début."));
    assert!(markdown.contains("Fin."));
}

/// Test replacement keeps HTML blocks verbatim
#[test]
fn test_replace_withHtmlBlock_shouldKeepBlockVerbatim() {
    let text = "<Callout type=\"info\">\n  Careful here.\n</Callout>\n\nAfter text.\n";
    let document = MarkdownDocument::parse(text);
    let adapter = adapter();

    let rebuilt = adapter
        .replace(&document, &["Ensuite.".to_string()])
        .expect("Replace failed");
    let markdown = rebuilt.to_markdown().expect("Serialize failed");

    assert!(markdown.contains("<Callout type=\"info\">"));
    assert!(markdown.contains("Careful here."));
    assert!(markdown.contains("Ensuite."));
}

/// Test replacement rewrites configured front matter values
#[test]
fn test_replace_withFrontMatterKeys_shouldRewriteConfiguredValues() {
    let text = "---\ntitle: Getting started\ndraft: true\n---\n\n# Body\n";
    let document = MarkdownDocument::parse(text);
    let adapter = front_matter_adapter(&["title"]);

    let rebuilt = adapter
        .replace(
            &document,
            &["Premiers pas".to_string(), "Corps".to_string()],
        )
        .expect("Replace failed");
    let markdown = rebuilt.to_markdown().expect("Serialize failed");

    assert!(markdown.contains("title: Premiers pas"));
    assert!(markdown.contains("draft: true"));
    assert!(markdown.contains("# Corps"));
}

/// Test replacement rejects a translation list of the wrong length
#[test]
fn test_replace_withWrongCount_shouldReturnCountMismatch() {
    let document = MarkdownDocument::parse("# One\n\nTwo.\n");

    let result = adapter().replace(&document, &["only one".to_string()]);

    assert!(matches!(
        result,
        Err(DocumentError::TranslationCountMismatch {
            expected: 2,
            actual: 1
        })
    ));
}

/// Test that replacing every run with its own extraction is the identity
#[test]
fn test_replace_withExtractedStrings_shouldReproduceDocument() {
    let text = "# Title\n\nSome **bold** text with a [link](https://example.com).\n\n\
                - First item\n- Second item\n\n```sh\nmake install\n```\n\nline one\nline two\n";
    let document = MarkdownDocument::parse(text);
    let adapter = adapter();

    let strings = adapter.extract(&document).expect("Extract failed");
    let rebuilt = adapter.replace(&document, &strings).expect("Replace failed");

    assert_eq!(
        rebuilt.to_markdown().expect("Serialize failed"),
        document.to_markdown().expect("Serialize failed")
    );
}

/// Test serialized output always ends with a newline
#[test]
fn test_toMarkdown_shouldEndWithNewline() {
    let document = MarkdownDocument::parse("Just text");

    let markdown = document.to_markdown().expect("Serialize failed");

    assert!(markdown.ends_with('\n'));
}
