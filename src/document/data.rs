/*!
 * JSON and YAML document adapters.
 *
 * Both formats walk their parsed value tree depth-first in parser order
 * (object/mapping entries in document order, array elements in sequence
 * order) and visit string leaves. Which leaves are translatable is
 * decided by a [`KeySelector`]: either every string value, or only
 * values sitting under a configured mapping key (at any depth below it).
 * Extraction and replacement run the same walk with a different
 * callback.
 */

use crate::errors::DocumentError;

use super::DocumentAdapter;

/// Selects which string leaves of a value tree are translatable
#[derive(Debug, Clone)]
pub enum KeySelector {
    /// Every string leaf is translatable
    All,
    /// A string leaf is translatable when any ancestor mapping key is in
    /// the set
    Keys(Vec<String>),
}

impl KeySelector {
    fn selects_all(&self) -> bool {
        matches!(self, Self::All)
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Keys(keys) => keys.iter().any(|k| k == key),
        }
    }
}

/// Visit callback contract shared by extraction and replacement: return
/// `None` to observe a leaf, `Some(text)` to rewrite it.
type VisitResult = Result<Option<String>, DocumentError>;

/// Walk a JSON value depth-first, visiting translatable string leaves.
///
/// Returns whether any leaf was rewritten. Whitespace-only strings are
/// never translatable.
pub(crate) fn visit_json_strings<F>(
    value: &mut serde_json::Value,
    selected: bool,
    selector: &KeySelector,
    visit: &mut F,
) -> Result<bool, DocumentError>
where
    F: FnMut(&str) -> VisitResult,
{
    match value {
        serde_json::Value::String(text) => {
            if (selected || selector.selects_all()) && !text.trim().is_empty() {
                if let Some(replacement) = visit(text)? {
                    *text = replacement;
                    return Ok(true);
                }
            }
            Ok(false)
        }
        serde_json::Value::Array(items) => {
            let mut changed = false;
            for item in items {
                changed |= visit_json_strings(item, selected, selector, visit)?;
            }
            Ok(changed)
        }
        serde_json::Value::Object(map) => {
            let mut changed = false;
            for (key, item) in map.iter_mut() {
                let child_selected = selected || selector.matches(key);
                changed |= visit_json_strings(item, child_selected, selector, visit)?;
            }
            Ok(changed)
        }
        _ => Ok(false),
    }
}

/// Walk a YAML value depth-first, visiting translatable string leaves.
///
/// Same discipline as [`visit_json_strings`]; non-string mapping keys are
/// never selected and tagged values are walked through their inner value.
pub(crate) fn visit_yaml_strings<F>(
    value: &mut serde_yaml::Value,
    selected: bool,
    selector: &KeySelector,
    visit: &mut F,
) -> Result<bool, DocumentError>
where
    F: FnMut(&str) -> VisitResult,
{
    match value {
        serde_yaml::Value::String(text) => {
            if (selected || selector.selects_all()) && !text.trim().is_empty() {
                if let Some(replacement) = visit(text)? {
                    *text = replacement;
                    return Ok(true);
                }
            }
            Ok(false)
        }
        serde_yaml::Value::Sequence(items) => {
            let mut changed = false;
            for item in items {
                changed |= visit_yaml_strings(item, selected, selector, visit)?;
            }
            Ok(changed)
        }
        serde_yaml::Value::Mapping(map) => {
            let mut changed = false;
            for (key, item) in map.iter_mut() {
                let child_selected = selected
                    || key.as_str().is_some_and(|k| selector.matches(k));
                changed |= visit_yaml_strings(item, child_selected, selector, visit)?;
            }
            Ok(changed)
        }
        serde_yaml::Value::Tagged(tagged) => {
            visit_yaml_strings(&mut tagged.value, selected, selector, visit)
        }
        _ => Ok(false),
    }
}

/// A parsed JSON document
#[derive(Debug, Clone)]
pub struct JsonDocument {
    value: serde_json::Value,
}

impl JsonDocument {
    /// Parse JSON source text
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(text)
            .map(|value| Self { value })
            .map_err(|e| DocumentError::ParseFailed(e.to_string()))
    }

    /// Wrap an already-parsed value
    pub fn from_value(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Serialize back to pretty-printed JSON with a trailing newline
    pub fn to_json(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(&self.value)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| DocumentError::SerializeFailed(e.to_string()))
    }

    /// The underlying value
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }
}

/// A parsed YAML document
#[derive(Debug, Clone)]
pub struct YamlDocument {
    value: serde_yaml::Value,
}

impl YamlDocument {
    /// Parse YAML source text
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        serde_yaml::from_str(text)
            .map(|value| Self { value })
            .map_err(|e| DocumentError::ParseFailed(e.to_string()))
    }

    /// Wrap an already-parsed value
    pub fn from_value(value: serde_yaml::Value) -> Self {
        Self { value }
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(&self.value)
            .map_err(|e| DocumentError::SerializeFailed(e.to_string()))
    }

    /// The underlying value
    pub fn value(&self) -> &serde_yaml::Value {
        &self.value
    }
}

/// Adapter over JSON value trees
#[derive(Debug, Clone)]
pub struct JsonAdapter {
    selector: KeySelector,
}

impl JsonAdapter {
    pub fn new(selector: KeySelector) -> Self {
        Self { selector }
    }
}

impl DocumentAdapter for JsonAdapter {
    type Document = JsonDocument;

    fn extract(&self, document: &JsonDocument) -> Result<Vec<String>, DocumentError> {
        let mut strings = Vec::new();
        let mut scratch = document.value.clone();
        visit_json_strings(&mut scratch, false, &self.selector, &mut |text| {
            strings.push(text.to_string());
            Ok(None)
        })?;
        Ok(strings)
    }

    fn replace(
        &self,
        document: &JsonDocument,
        translations: &[String],
    ) -> Result<JsonDocument, DocumentError> {
        let expected = self.extract(document)?.len();
        if expected != translations.len() {
            return Err(DocumentError::TranslationCountMismatch {
                expected,
                actual: translations.len(),
            });
        }

        let mut value = document.value.clone();
        let mut next = 0;
        visit_json_strings(&mut value, false, &self.selector, &mut |_| {
            let translation = translations[next].clone();
            next += 1;
            Ok(Some(translation))
        })?;

        Ok(JsonDocument { value })
    }
}

/// Adapter over YAML value trees
#[derive(Debug, Clone)]
pub struct YamlAdapter {
    selector: KeySelector,
}

impl YamlAdapter {
    pub fn new(selector: KeySelector) -> Self {
        Self { selector }
    }
}

impl DocumentAdapter for YamlAdapter {
    type Document = YamlDocument;

    fn extract(&self, document: &YamlDocument) -> Result<Vec<String>, DocumentError> {
        let mut strings = Vec::new();
        let mut scratch = document.value.clone();
        visit_yaml_strings(&mut scratch, false, &self.selector, &mut |text| {
            strings.push(text.to_string());
            Ok(None)
        })?;
        Ok(strings)
    }

    fn replace(
        &self,
        document: &YamlDocument,
        translations: &[String],
    ) -> Result<YamlDocument, DocumentError> {
        let expected = self.extract(document)?.len();
        if expected != translations.len() {
            return Err(DocumentError::TranslationCountMismatch {
                expected,
                actual: translations.len(),
            });
        }

        let mut value = document.value.clone();
        let mut next = 0;
        visit_yaml_strings(&mut value, false, &self.selector, &mut |_| {
            let translation = translations[next].clone();
            next += 1;
            Ok(Some(translation))
        })?;

        Ok(YamlDocument { value })
    }
}
