/*!
 * Integration tests for application wiring: controller construction,
 * offline runs through the public constructor, and the memory stats
 * surface used by the CLI
 */

use std::fs;

use anyhow::Result;
use tokio_test;

use yadtwai::app_config::TranslationProvider;
use yadtwai::app_controller::Controller;
use yadtwai::memory::{SqliteMemory, TranslationStore};
use yadtwai::translation::TranslationMode;

use crate::common;

/// Test that offline mode needs no provider credentials
#[test]
fn test_controllerNew_offlineMode_shouldSucceedWithoutApiKey() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());

    let controller = Controller::new(config, TranslationMode::Offline);
    assert!(controller.is_ok());

    Ok(())
}

/// Test that local providers construct without credentials
#[test]
fn test_controllerNew_withOllamaProvider_shouldSucceedWithoutApiKey() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let mut config = common::test_config(temp.path());
    config.translation.provider = TranslationProvider::Ollama;

    let controller = Controller::new(config, TranslationMode::Hybrid);
    assert!(controller.is_ok());

    Ok(())
}

/// Test that a key in the config file is enough for a remote provider
#[test]
fn test_controllerNew_withConfiguredApiKey_shouldSucceed() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let mut config = common::test_config(temp.path());
    config.translation.provider = TranslationProvider::DeepL;
    if let Some(entry) = config
        .translation
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "deepl")
    {
        entry.api_key = "abc123:fx".to_string();
    }

    let controller = Controller::new(config, TranslationMode::Hybrid);
    assert!(controller.is_ok());

    Ok(())
}

/// Test a full offline run through the public constructor
#[test]
fn test_controllerNew_offlineRun_shouldProduceOutputsFromMemory() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let config = common::test_config(temp.path());
    common::create_test_markdown(temp.path(), "docs/page.md")?;

    let memory = SqliteMemory::open(&config.memory.path)?;
    tokio_test::block_on(async {
        memory.set("Getting started", "fr", "Premiers pas").await?;
        memory
            .set("Install the tool and run it.", "fr", "Installez l'outil.")
            .await
    })?;
    drop(memory);

    let controller = Controller::new(config.clone(), TranslationMode::Offline)?;
    tokio_test::block_on(controller.run(false))?;

    let translated = fs::read_to_string(common::output_file(&config, "fr", "page.md"))?;
    assert!(translated.contains("Premiers pas"));
    assert!(translated.contains("Installez l'outil."));

    Ok(())
}

/// Test the stats surface the memory subcommand prints
#[test]
fn test_memoryStats_afterSetsAndGets_shouldReportCounts() -> Result<()> {
    let temp = common::create_temp_dir()?;
    let memory = SqliteMemory::open(temp.path().join("memory.db"))?;

    tokio_test::block_on(async {
        memory.set("Hello", "fr", "Bonjour").await?;
        memory.set("Hello", "es", "Hola").await?;

        let hit = memory.get("Hello", "fr").await?;
        assert_eq!(hit, Some("Bonjour".to_string()));

        let stats = memory.stats().await?;
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.total_hits, 1);
        assert_eq!(
            stats.per_language,
            vec![("es".to_string(), 1), ("fr".to_string(), 1)]
        );
        assert!(stats.file_size_bytes > 0);

        let rendered = format!("{}", stats);
        assert!(rendered.starts_with("Entries: 2, Hits: 1"));

        Ok(())
    })
}
