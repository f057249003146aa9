/*!
 * Integration tests for end-to-end translation runs
 */

use std::fs;
use std::sync::Arc;

use anyhow::Result;
use tokio_test;

use yadtwai::app_config::Config;
use yadtwai::app_controller::Controller;
use yadtwai::document::{IGNORE_END_MARKER, IGNORE_START_MARKER};
use yadtwai::memory::{SqliteMemory, TranslationStore};
use yadtwai::providers::mock::{expected_translation, MockProvider};
use yadtwai::providers::Provider;
use yadtwai::translation::{EngineOptions, TranslationEngine, TranslationMode};

use crate::common;

/// Build a controller over a mock provider and the file-backed memory the
/// config points to
fn mock_controller(
    config: &Config,
    mock: &MockProvider,
    mode: TranslationMode,
) -> Result<Controller> {
    let memory = SqliteMemory::open(&config.memory.path)?;
    let engine = TranslationEngine::new(
        Some(Box::new(mock.clone()) as Box<dyn Provider>),
        Arc::new(memory),
        EngineOptions {
            mode,
            ..EngineOptions::default()
        },
    );
    Ok(Controller::with_engine(config.clone(), engine))
}

/// Build a provider-less offline controller
fn offline_controller(config: &Config) -> Result<Controller> {
    let memory = SqliteMemory::open(&config.memory.path)?;
    let engine = TranslationEngine::new(
        None,
        Arc::new(memory),
        EngineOptions {
            mode: TranslationMode::Offline,
            ..EngineOptions::default()
        },
    );
    Ok(Controller::with_engine(config.clone(), engine))
}

/// Test a full run over a nested markdown tree
#[test]
fn test_run_withMarkdownTree_shouldWriteTranslatedOutputs() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_file(
        temp.path(),
        "docs/guide/intro.md",
        "# Welcome\n\nThis is the guide.\n",
    )?;

    let mock = MockProvider::working();
    let controller = mock_controller(&config, &mock, TranslationMode::Hybrid)?;
    tokio_test::block_on(controller.run(false))?;

    let output = common::output_file(&config, "fr", "guide/intro.md");
    assert!(output.exists(), "Output file should exist");

    let translated = fs::read_to_string(output)?;
    assert!(translated.contains(&expected_translation("Welcome", "fr")));
    assert!(translated.contains(&expected_translation("This is the guide.", "fr")));
    assert!(mock.call_count() >= 1);

    Ok(())
}

/// Test a JSON document only translates configured keys
#[test]
fn test_run_withJsonDocument_shouldTranslateConfiguredKeysOnly() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_file(
        temp.path(),
        "docs/meta.json",
        r#"{"title": "Getting started", "version": "2.0"}"#,
    )?;

    let mock = MockProvider::working();
    let controller = mock_controller(&config, &mock, TranslationMode::Hybrid)?;
    tokio_test::block_on(controller.run(false))?;

    let translated = fs::read_to_string(common::output_file(&config, "fr", "meta.json"))?;
    assert!(translated.contains(&expected_translation("Getting started", "fr")));
    assert!(translated.contains("\"version\": \"2.0\""));

    Ok(())
}

/// Test a YAML document only translates configured keys
#[test]
fn test_run_withYamlDocument_shouldTranslateConfiguredKeysOnly() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_file(
        temp.path(),
        "docs/nav.yml",
        "title: Overview\nitems:\n  - label: Home\n    path: /home\n",
    )?;

    let mock = MockProvider::working();
    let controller = mock_controller(&config, &mock, TranslationMode::Hybrid)?;
    tokio_test::block_on(controller.run(false))?;

    let translated = fs::read_to_string(common::output_file(&config, "fr", "nav.yml"))?;
    assert!(translated.contains(&expected_translation("Overview", "fr")));
    assert!(translated.contains(&expected_translation("Home", "fr")));
    assert!(translated.contains("/home"));

    Ok(())
}

/// Test excluded directories are never translated
#[test]
fn test_run_withExcludedDirectory_shouldSkipIt() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_markdown(temp.path(), "docs/real.md")?;
    common::create_test_markdown(temp.path(), "docs/node_modules/dep.md")?;

    let mock = MockProvider::working();
    let controller = mock_controller(&config, &mock, TranslationMode::Hybrid)?;
    tokio_test::block_on(controller.run(false))?;

    assert!(common::output_file(&config, "fr", "real.md").exists());
    assert!(!common::output_file(&config, "fr", "node_modules/dep.md").exists());

    Ok(())
}

/// Test a rerun leaves existing outputs alone without touching the provider
#[test]
fn test_run_secondRun_shouldSkipExistingOutputs() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_markdown(temp.path(), "docs/page.md")?;

    let first = MockProvider::working();
    tokio_test::block_on(
        mock_controller(&config, &first, TranslationMode::Hybrid)?.run(false),
    )?;
    assert!(common::output_file(&config, "fr", "page.md").exists());

    // Online mode would call the provider for every string; a skipped
    // document never reaches the engine at all
    let second = MockProvider::working();
    tokio_test::block_on(
        mock_controller(&config, &second, TranslationMode::Online)?.run(false),
    )?;

    assert_eq!(second.call_count(), 0);

    Ok(())
}

/// Test force overwrite reprocesses documents with existing outputs
#[test]
fn test_run_withForceOverwrite_shouldReprocessDocuments() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_markdown(temp.path(), "docs/page.md")?;

    let first = MockProvider::working();
    tokio_test::block_on(
        mock_controller(&config, &first, TranslationMode::Hybrid)?.run(false),
    )?;

    let second = MockProvider::working();
    tokio_test::block_on(
        mock_controller(&config, &second, TranslationMode::Online)?.run(true),
    )?;

    assert!(second.call_count() >= 1);
    assert!(common::output_file(&config, "fr", "page.md").exists());

    Ok(())
}

/// Test a warm memory serves a rerun without any provider call
#[test]
fn test_run_withWarmMemory_shouldRebuildWithoutProviderCalls() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_markdown(temp.path(), "docs/page.md")?;

    let first = MockProvider::working();
    tokio_test::block_on(
        mock_controller(&config, &first, TranslationMode::Hybrid)?.run(false),
    )?;

    // Losing the output is cheap: the memory still has every string
    let output = common::output_file(&config, "fr", "page.md");
    fs::remove_file(&output)?;

    let second = MockProvider::working();
    tokio_test::block_on(
        mock_controller(&config, &second, TranslationMode::Hybrid)?.run(false),
    )?;

    assert!(output.exists());
    let translated = fs::read_to_string(&output)?;
    assert!(translated.contains(&expected_translation("Getting started", "fr")));
    assert_eq!(second.call_count(), 0);

    Ok(())
}

/// Test offline mode serves stored strings and falls back to the source
#[test]
fn test_run_offlineMode_shouldUseMemoryAndFallBackToSource() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_file(
        temp.path(),
        "docs/meta.json",
        r#"{"title": "Getting started", "description": "Not stored"}"#,
    )?;

    let memory = SqliteMemory::open(&config.memory.path)?;
    tokio_test::block_on(memory.set("Getting started", "fr", "Premiers pas"))?;
    drop(memory);

    let controller = offline_controller(&config)?;
    tokio_test::block_on(controller.run(false))?;

    let translated = fs::read_to_string(common::output_file(&config, "fr", "meta.json"))?;
    assert!(translated.contains("Premiers pas"));
    assert!(translated.contains("Not stored"));

    Ok(())
}

/// Test one broken document does not abort the run
#[test]
fn test_run_withFailingDocuments_shouldContinueAndLogIssues() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_file(temp.path(), "docs/a.md", "Alpha.\n")?;
    common::create_test_file(temp.path(), "docs/b.md", "Beta.\n")?;

    // Connects fine, but every batch comes back one translation short
    let mock = MockProvider::short_batch();
    let controller = mock_controller(&config, &mock, TranslationMode::Hybrid)?;
    let result = tokio_test::block_on(controller.run(false));

    assert!(result.is_ok(), "Per-document failures should not abort the run");
    assert!(!common::output_file(&config, "fr", "a.md").exists());
    assert!(!common::output_file(&config, "fr", "b.md").exists());
    assert_eq!(mock.call_count(), 2);

    // Failures land in the issues log next to the working directory
    let issues = fs::read_to_string("yadtwai.issues.log")?;
    assert!(issues.contains("a.md"));
    assert!(issues.contains("b.md"));
    fs::remove_file("yadtwai.issues.log").ok();

    Ok(())
}

/// Test non-document files are mirrored into every target tree
#[test]
fn test_run_withCopyOtherFiles_shouldMirrorAssets() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let mut config = common::test_config(temp.path());
    config.files.copy_other_files = true;
    config.target_languages = vec!["fr".to_string(), "es".to_string()];

    common::create_test_markdown(temp.path(), "docs/index.md")?;
    common::create_test_file(temp.path(), "docs/logo.svg", "<svg/>")?;

    let mock = MockProvider::working();
    let controller = mock_controller(&config, &mock, TranslationMode::Hybrid)?;
    tokio_test::block_on(controller.run(false))?;

    for language in ["fr", "es"] {
        let page = fs::read_to_string(common::output_file(&config, language, "index.md"))?;
        assert!(page.contains(&expected_translation("Getting started", language)));

        let asset = fs::read_to_string(common::output_file(&config, language, "logo.svg"))?;
        assert_eq!(asset, "<svg/>");
    }

    Ok(())
}

/// Test ignore regions travel through a run untouched
#[test]
fn test_run_withIgnoreRegions_shouldKeepRegionContentVerbatim() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());

    let text = format!(
        "Before text.\n\n{}\nSecret *raw* content.\n{}\n\nAfter text.\n",
        IGNORE_START_MARKER, IGNORE_END_MARKER
    );
    common::create_test_file(temp.path(), "docs/page.md", &text)?;

    let mock = MockProvider::working();
    let controller = mock_controller(&config, &mock, TranslationMode::Hybrid)?;
    tokio_test::block_on(controller.run(false))?;

    let translated = fs::read_to_string(common::output_file(&config, "fr", "page.md"))?;
    assert!(translated.contains("Secret *raw* content."));
    assert!(translated.contains(&expected_translation("Before text.", "fr")));
    assert!(translated.contains(&expected_translation("After text.", "fr")));

    Ok(())
}
