use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and describing the
/// language codes used in configuration and provider requests. Codes are
/// ISO 639-1 (2-letter) or ISO 639-3 (3-letter), optionally carrying a
/// BCP 47 style region suffix ("en-US", "pt_BR") which providers receive
/// verbatim but which plays no role in validation or matching.

/// Extract the primary language subtag from a code like "en-US" or "pt_BR"
pub fn primary_subtag(code: &str) -> &str {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
}

/// Validate that a language code has a recognized primary subtag
pub fn validate_language_code(code: &str) -> Result<()> {
    let primary = primary_subtag(code).to_lowercase();

    match primary.len() {
        2 if Language::from_639_1(&primary).is_some() => Ok(()),
        3 if Language::from_639_3(&primary).is_some() => Ok(()),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Look up the isolang entry for a code's primary subtag
fn lookup(code: &str) -> Option<Language> {
    let primary = primary_subtag(code).to_lowercase();
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// Check if two language codes represent the same language
///
/// Region suffixes are ignored, so "en" matches "en-US" but not "fr".
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (lookup(code1), lookup(code2)) {
        (Some(l1), Some(l2)) => l1 == l2,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|language| language.to_name().to_string())
        .ok_or_else(|| anyhow!("Unknown language code: {}", code))
}
