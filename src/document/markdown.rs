/*!
 * Markdown/MDX document adapter.
 *
 * A document is the owned pulldown-cmark event stream of the source
 * text. One walker drives both extraction and replacement: it merges the
 * inline content of each block container (paragraph, heading, list item,
 * table cell, ...) into a single translatable string, serialized as
 * inline markdown so emphasis, links and similar formatting survive the
 * trip through a translator. Code blocks, HTML blocks and standalone
 * images are protected spans; inline code and inline HTML at the top
 * nesting level break a run and pass through verbatim. Front-matter
 * values under configured keys are visited through the YAML value
 * walker. Replacement parses each translated string back into events and
 * splices it where the run was.
 */

use log::debug;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::errors::DocumentError;

use super::data::{visit_yaml_strings, KeySelector};
use super::DocumentAdapter;

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    options
}

/// A parsed markdown document
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    events: Vec<Event<'static>>,
}

impl MarkdownDocument {
    /// Parse markdown source text
    pub fn parse(text: &str) -> Self {
        let events = Parser::new_ext(text, parser_options())
            .map(|event| event.into_static())
            .collect();
        Self { events }
    }

    fn from_events(events: Vec<Event<'static>>) -> Self {
        Self { events }
    }

    /// Serialize back to markdown with a trailing newline
    pub fn to_markdown(&self) -> Result<String, DocumentError> {
        let mut text = String::new();
        pulldown_cmark_to_cmark::cmark(self.events.iter(), &mut text)
            .map_err(|e| DocumentError::SerializeFailed(e.to_string()))?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }

    /// The underlying event stream
    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }
}

/// Adapter over markdown event streams
#[derive(Debug, Clone)]
pub struct MarkdownAdapter {
    front_matter_keys: Vec<String>,
}

impl MarkdownAdapter {
    /// Build an adapter; `front_matter_keys` lists the metadata keys whose
    /// values are translated (empty list: front matter passes through)
    pub fn new(front_matter_keys: Vec<String>) -> Self {
        Self { front_matter_keys }
    }
}

impl DocumentAdapter for MarkdownAdapter {
    type Document = MarkdownDocument;

    fn extract(&self, document: &MarkdownDocument) -> Result<Vec<String>, DocumentError> {
        let mut strings = Vec::new();
        rewrite_events(&document.events, &self.front_matter_keys, &mut |text| {
            strings.push(text.to_string());
            Ok(None)
        })?;
        Ok(strings)
    }

    fn replace(
        &self,
        document: &MarkdownDocument,
        translations: &[String],
    ) -> Result<MarkdownDocument, DocumentError> {
        let expected = self.extract(document)?.len();
        if expected != translations.len() {
            return Err(DocumentError::TranslationCountMismatch {
                expected,
                actual: translations.len(),
            });
        }

        let mut next = 0;
        let events = rewrite_events(&document.events, &self.front_matter_keys, &mut |_| {
            let translation = translations[next].clone();
            next += 1;
            Ok(Some(translation))
        })?;

        Ok(MarkdownDocument::from_events(events))
    }
}

/// Walk an event stream, visiting translatable runs in document order.
///
/// The callback receives each run's inline markdown and returns `None` to
/// keep the original events or `Some(text)` to splice a rewritten run.
/// Returns the rebuilt stream; extraction discards it.
fn rewrite_events<F>(
    events: &[Event<'static>],
    front_matter_keys: &[String],
    visit: &mut F,
) -> Result<Vec<Event<'static>>, DocumentError>
where
    F: FnMut(&str) -> Result<Option<String>, DocumentError>,
{
    let mut output: Vec<Event<'static>> = Vec::with_capacity(events.len());
    let mut run: Vec<Event<'static>> = Vec::new();
    // open protected spans (code blocks, HTML blocks, standalone images)
    let mut protected = 0usize;
    // open inline formatting tags within the current run
    let mut inline_depth = 0usize;
    let mut in_metadata = false;

    for event in events.iter().cloned() {
        if in_metadata {
            match event {
                Event::Text(text) => {
                    match rewrite_front_matter(&text, front_matter_keys, visit)? {
                        Some(rewritten) => output.push(Event::Text(CowStr::from(rewritten))),
                        None => output.push(Event::Text(text)),
                    }
                }
                Event::End(TagEnd::MetadataBlock(_)) => {
                    in_metadata = false;
                    output.push(event);
                }
                other => output.push(other),
            }
            continue;
        }

        if protected > 0 {
            match &event {
                Event::Start(Tag::CodeBlock(_) | Tag::HtmlBlock | Tag::Image { .. }) => {
                    protected += 1;
                }
                Event::End(TagEnd::CodeBlock | TagEnd::HtmlBlock | TagEnd::Image) => {
                    protected -= 1;
                }
                _ => {}
            }
            output.push(event);
            continue;
        }

        match event {
            Event::Start(Tag::MetadataBlock(_)) => {
                flush_run(&mut run, &mut output, visit)?;
                in_metadata = true;
                output.push(event);
            }
            Event::Start(Tag::CodeBlock(_) | Tag::HtmlBlock) => {
                flush_run(&mut run, &mut output, visit)?;
                protected += 1;
                output.push(event);
            }
            Event::Start(Tag::Image { .. }) => {
                if run.is_empty() && inline_depth == 0 {
                    // standalone image: protected span, alt text stays put
                    protected += 1;
                    output.push(event);
                } else {
                    inline_depth += 1;
                    run.push(event);
                }
            }
            Event::Start(Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. }) => {
                inline_depth += 1;
                run.push(event);
            }
            Event::End(
                TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image,
            ) => {
                inline_depth = inline_depth.saturating_sub(1);
                run.push(event);
            }
            Event::Text(_) | Event::SoftBreak | Event::HardBreak => {
                run.push(event);
            }
            Event::Code(_) | Event::InlineHtml(_) | Event::FootnoteReference(_) => {
                // run-breaking at the top nesting level; embedded in the
                // run string when inline formatting is open around it
                if inline_depth > 0 {
                    run.push(event);
                } else {
                    flush_run(&mut run, &mut output, visit)?;
                    output.push(event);
                }
            }
            other => {
                // block boundary
                flush_run(&mut run, &mut output, visit)?;
                inline_depth = 0;
                output.push(other);
            }
        }
    }

    flush_run(&mut run, &mut output, visit)?;
    Ok(output)
}

/// Hand the pending run to the callback and emit the kept or rewritten
/// events. Whitespace-only runs are not translatable.
fn flush_run<F>(
    run: &mut Vec<Event<'static>>,
    output: &mut Vec<Event<'static>>,
    visit: &mut F,
) -> Result<(), DocumentError>
where
    F: FnMut(&str) -> Result<Option<String>, DocumentError>,
{
    if run.is_empty() {
        return Ok(());
    }

    let text = run_to_inline_markdown(run)?;
    if text.trim().is_empty() {
        output.append(run);
        return Ok(());
    }

    match visit(&text)? {
        Some(translation) => {
            output.extend(parse_inline_fragment(&translation));
            run.clear();
        }
        None => output.append(run),
    }

    Ok(())
}

/// Serialize a run's events to inline markdown
fn run_to_inline_markdown(events: &[Event<'static>]) -> Result<String, DocumentError> {
    let mut text = String::new();
    pulldown_cmark_to_cmark::cmark(events.iter(), &mut text)
        .map_err(|e| DocumentError::SerializeFailed(e.to_string()))?;
    Ok(text)
}

/// Parse a translated run back into events, unwrapping the paragraph a
/// single-paragraph parse produces so the result splices at inline
/// position. Multi-block translations are spliced as parsed.
fn parse_inline_fragment(text: &str) -> Vec<Event<'static>> {
    let events: Vec<Event<'static>> = Parser::new_ext(text, parser_options())
        .map(|event| event.into_static())
        .collect();

    let paragraphs = events
        .iter()
        .filter(|e| matches!(e, Event::Start(Tag::Paragraph)))
        .count();
    if paragraphs == 1
        && matches!(events.first(), Some(Event::Start(Tag::Paragraph)))
        && matches!(events.last(), Some(Event::End(TagEnd::Paragraph)))
    {
        events[1..events.len() - 1].to_vec()
    } else {
        events
    }
}

/// Rewrite front-matter YAML through the configured key list.
///
/// Returns `Some(yaml)` when a value was replaced, `None` when the text
/// should pass through unchanged. Front matter that fails to parse as
/// YAML is left untouched.
fn rewrite_front_matter<F>(
    text: &str,
    keys: &[String],
    visit: &mut F,
) -> Result<Option<String>, DocumentError>
where
    F: FnMut(&str) -> Result<Option<String>, DocumentError>,
{
    if keys.is_empty() {
        return Ok(None);
    }

    let Ok(mut value) = serde_yaml::from_str::<serde_yaml::Value>(text) else {
        debug!("Front matter is not valid YAML, leaving it untouched");
        return Ok(None);
    };

    let selector = KeySelector::Keys(keys.to_vec());
    let changed = visit_yaml_strings(&mut value, false, &selector, visit)?;
    if !changed {
        return Ok(None);
    }

    serde_yaml::to_string(&value)
        .map(Some)
        .map_err(|e| DocumentError::SerializeFailed(e.to_string()))
}
