/*!
 * Tests for the JSON and YAML document adapters
 */

use yadtwai::document::{
    DocumentAdapter, JsonAdapter, JsonDocument, KeySelector, YamlAdapter, YamlDocument,
};
use yadtwai::errors::DocumentError;

fn keys(list: &[&str]) -> KeySelector {
    KeySelector::Keys(list.iter().map(|k| k.to_string()).collect())
}

/// Test that the all-strings selector collects every string leaf in order
#[test]
fn test_jsonExtract_withAllSelector_shouldCollectEveryString() {
    let document = JsonDocument::parse(
        r#"{"title": "Hello", "nested": {"description": "World"}, "count": 3, "tags": ["a", "b"]}"#,
    )
    .expect("Parse failed");

    let strings = JsonAdapter::new(KeySelector::All)
        .extract(&document)
        .expect("Extract failed");

    assert_eq!(strings, vec!["Hello", "World", "a", "b"]);
}

/// Test that the key selector only collects values under configured keys
#[test]
fn test_jsonExtract_withKeySelector_shouldCollectOnlyConfiguredKeys() {
    let document = JsonDocument::parse(
        r#"{"title": "Hello", "body": "Skip me", "meta": {"title": "Nested", "author": "Jane"}}"#,
    )
    .expect("Parse failed");

    let strings = JsonAdapter::new(keys(&["title"]))
        .extract(&document)
        .expect("Extract failed");

    assert_eq!(strings, vec!["Hello", "Nested"]);
}

/// Test that a selected key covers all its descendants
#[test]
fn test_jsonExtract_withNestedValuesUnderKey_shouldCollectDescendants() {
    let document = JsonDocument::parse(
        r#"{"description": {"short": "Brief", "long": "Extended"}, "id": "x9"}"#,
    )
    .expect("Parse failed");

    let strings = JsonAdapter::new(keys(&["description"]))
        .extract(&document)
        .expect("Extract failed");

    assert_eq!(strings, vec!["Brief", "Extended"]);
}

/// Test that whitespace-only strings are never translatable
#[test]
fn test_jsonExtract_withWhitespaceOnlyString_shouldSkipIt() {
    let document =
        JsonDocument::parse(r#"{"title": "  ", "label": "Real"}"#).expect("Parse failed");

    let strings = JsonAdapter::new(KeySelector::All)
        .extract(&document)
        .expect("Extract failed");

    assert_eq!(strings, vec!["Real"]);
}

/// Test replacement rewrites selected values and leaves the rest alone
#[test]
fn test_jsonReplace_shouldRewriteSelectedValuesOnly() {
    let document = JsonDocument::parse(
        r#"{"title": "Hello", "version": "2.0", "count": 3}"#,
    )
    .expect("Parse failed");
    let adapter = JsonAdapter::new(keys(&["title"]));

    let rebuilt = adapter
        .replace(&document, &["Bonjour".to_string()])
        .expect("Replace failed");
    let json = rebuilt.to_json().expect("Serialize failed");

    assert!(json.contains("\"title\": \"Bonjour\""));
    assert!(json.contains("\"version\": \"2.0\""));
    assert!(json.contains("\"count\": 3"));
}

/// Test replacement rejects a translation list of the wrong length
#[test]
fn test_jsonReplace_withWrongCount_shouldReturnCountMismatch() {
    let document =
        JsonDocument::parse(r#"{"title": "One", "label": "Two"}"#).expect("Parse failed");

    let result = JsonAdapter::new(KeySelector::All).replace(&document, &[]);

    assert!(matches!(
        result,
        Err(DocumentError::TranslationCountMismatch {
            expected: 2,
            actual: 0
        })
    ));
}

/// Test serialization preserves the original key order
#[test]
fn test_jsonSerialization_shouldPreserveKeyOrder() {
    let document =
        JsonDocument::parse(r#"{"zebra": "1", "apple": "2"}"#).expect("Parse failed");

    let json = document.to_json().expect("Serialize failed");

    let zebra = json.find("\"zebra\"").expect("zebra missing");
    let apple = json.find("\"apple\"").expect("apple missing");
    assert!(zebra < apple);
    assert!(json.ends_with('\n'));
}

/// Test that invalid JSON fails with a parse error
#[test]
fn test_jsonParse_withInvalidInput_shouldFail() {
    let result = JsonDocument::parse("{not json");

    assert!(matches!(result, Err(DocumentError::ParseFailed(_))));
}

/// Test YAML extraction with the key selector
#[test]
fn test_yamlExtract_withKeySelector_shouldCollectConfiguredValues() {
    let text = "title: Overview\nitems:\n  - label: Home\n    path: /home\n  - label: About\n    path: /about\n";
    let document = YamlDocument::parse(text).expect("Parse failed");

    let strings = YamlAdapter::new(keys(&["title", "label"]))
        .extract(&document)
        .expect("Extract failed");

    assert_eq!(strings, vec!["Overview", "Home", "About"]);
}

/// Test YAML replacement rewrites selected values and keeps the rest
#[test]
fn test_yamlReplace_shouldRewriteSelectedValuesOnly() {
    let text = "title: Overview\nitems:\n  - label: Home\n    path: /home\n";
    let document = YamlDocument::parse(text).expect("Parse failed");
    let adapter = YamlAdapter::new(keys(&["title", "label"]));

    let rebuilt = adapter
        .replace(&document, &["Aperçu".to_string(), "Accueil".to_string()])
        .expect("Replace failed");
    let yaml = rebuilt.to_yaml().expect("Serialize failed");

    assert!(yaml.contains("title: Aperçu"));
    assert!(yaml.contains("label: Accueil"));
    assert!(yaml.contains("path: /home"));
}

/// Test that replacing with the extraction is the identity for YAML
#[test]
fn test_yamlReplace_withExtractedStrings_shouldReproduceDocument() {
    let text = "title: Overview\ndescription: A short intro\ncount: 4\n";
    let document = YamlDocument::parse(text).expect("Parse failed");
    let adapter = YamlAdapter::new(KeySelector::All);

    let strings = adapter.extract(&document).expect("Extract failed");
    let rebuilt = adapter.replace(&document, &strings).expect("Replace failed");

    assert_eq!(
        rebuilt.to_yaml().expect("Serialize failed"),
        document.to_yaml().expect("Serialize failed")
    );
}

/// Test that invalid YAML fails with a parse error
#[test]
fn test_yamlParse_withInvalidInput_shouldFail() {
    let result = YamlDocument::parse("key: [unclosed");

    assert!(matches!(result, Err(DocumentError::ParseFailed(_))));
}
