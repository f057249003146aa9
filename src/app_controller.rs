use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::app_config::Config;
use crate::document::{
    restore_ignored_regions, strip_ignored_regions, DocumentAdapter, JsonAdapter, JsonDocument,
    KeySelector, MarkdownAdapter, MarkdownDocument, YamlAdapter, YamlDocument,
};
use crate::errors::{DocumentError, ProviderError};
use crate::file_utils::{DocumentType, FileManager, SourceFile};
use crate::translation::{MarkdownPolisher, TranslationEngine, TranslationMode};

// @module: Application controller for a documentation translation run

/// Issues encountered during a run are appended here
pub const ISSUES_LOG: &str = "yadtwai.issues.log";

/// Outcome of processing one source document
enum ProcessOutcome {
    /// Number of output files written
    Translated(usize),
    /// Every output already existed
    Skipped,
}

/// Main application controller for a translation run
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Engine built once for the whole run
    engine: TranslationEngine,
}

impl Controller {
    // @method: Create a controller, building the engine from the configuration
    pub fn new(config: Config, mode: TranslationMode) -> Result<Self> {
        let engine = TranslationEngine::from_config(&config, mode)?;
        Ok(Self { config, engine })
    }

    /// Create a controller around an already-built engine
    pub fn with_engine(config: Config, engine: TranslationEngine) -> Self {
        Self { config, engine }
    }

    /// Run the full translation workflow over the configured source directory
    pub async fn run(&self, force_overwrite: bool) -> Result<()> {
        let start_time = Instant::now();

        let source_dir = &self.config.files.source_dir;
        if !FileManager::dir_exists(source_dir) {
            return Err(anyhow!("Source directory does not exist: {:?}", source_dir));
        }

        if self.engine.mode() == TranslationMode::Offline {
            info!("🚀 yadtwai: translation memory only (offline mode)");
        } else {
            let model = self.config.translation.get_model();
            let provider_label = if model.is_empty() {
                self.config.translation.provider.display_name().to_string()
            } else {
                format!(
                    "{} - {}",
                    self.config.translation.provider.display_name(),
                    model
                )
            };
            info!("🚀 yadtwai: {} ({} mode)", provider_label, self.engine.mode());
        }

        // One failed probe aborts the run before any document is touched
        self.engine
            .test_connection()
            .await
            .context("Provider connection check failed")?;

        let files =
            FileManager::find_source_files(source_dir, &self.config.files.excluded_dirs)?;
        if files.is_empty() {
            return Err(anyhow!("No files found in {:?}", source_dir));
        }

        let (documents, others): (Vec<SourceFile>, Vec<SourceFile>) = files
            .into_iter()
            .partition(|file| file.document_type.is_translatable());

        info!(
            "Translating {} document(s) into {} language(s)",
            documents.len(),
            self.config.target_languages.len()
        );

        let multi_progress = MultiProgress::new();
        let overall_pb = multi_progress.add(ProgressBar::new(documents.len() as u64));
        overall_pb.set_style(Self::progress_style("files"));
        overall_pb.set_message("Processing documents");

        let mut translated_count = 0;
        let mut skipped_count = 0;
        let mut error_count = 0;

        for file in &documents {
            overall_pb.set_message(format!("Processing: {}", file.relative.display()));

            match self
                .process_document(file, &multi_progress, force_overwrite)
                .await
            {
                Ok(ProcessOutcome::Translated(written)) => {
                    translated_count += 1;
                    debug!("Wrote {} output file(s) for {}", written, file.relative.display());
                }
                Ok(ProcessOutcome::Skipped) => {
                    skipped_count += 1;
                    debug!(
                        "Skipping {}, all outputs exist (use -f to force overwrite)",
                        file.relative.display()
                    );
                }
                Err(e) => {
                    // One bad document does not stop the run
                    error_count += 1;
                    error!("Error processing {}: {}", file.relative.display(), e);
                    self.record_issue(&format!("{}: {}", file.relative.display(), e));

                    // A spent quota fails every remaining call; stop here
                    if Self::is_quota_error(&e) {
                        overall_pb.finish_and_clear();
                        return Err(e.context("Translation quota exhausted, aborting the run"));
                    }
                }
            }

            overall_pb.inc(1);
        }

        overall_pb.finish_and_clear();

        let copied_count = if self.config.files.copy_other_files {
            self.copy_other_files(&others, force_overwrite)?
        } else {
            if !others.is_empty() {
                debug!(
                    "{} non-document file(s) ignored (copy_other_files is off)",
                    others.len()
                );
            }
            0
        };

        info!(
            "Translation completed: {} translated, {} skipped, {} failed in {}",
            translated_count,
            skipped_count,
            error_count,
            Self::format_duration(start_time.elapsed())
        );
        if copied_count > 0 {
            info!("Copied {} non-document file(s)", copied_count);
        }
        if error_count > 0 {
            warn!("{} document(s) failed; details in {}", error_count, ISSUES_LOG);
        }

        match self.engine.memory_stats().await {
            Ok(stats) => info!("🧠 Memory: {}", stats),
            Err(e) => debug!("Could not read memory stats: {}", e),
        }

        Ok(())
    }

    /// Translate one document into every target language whose output is
    /// missing (or into all of them when forcing)
    async fn process_document(
        &self,
        file: &SourceFile,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<ProcessOutcome> {
        let languages = self.pending_languages(file, force_overwrite);
        if languages.is_empty() {
            return Ok(ProcessOutcome::Skipped);
        }

        let text = FileManager::read_to_string(&file.path)?;

        let progress = multi_progress.add(ProgressBar::new(languages.len() as u64));
        progress.set_style(Self::progress_style("languages"));
        progress.set_message(file.relative.display().to_string());

        let outputs = match file.document_type {
            DocumentType::Markdown => {
                let (stripped, regions) = strip_ignored_regions(&text)?;
                let document = MarkdownDocument::parse(&stripped);
                let adapter =
                    MarkdownAdapter::new(self.config.markdown.front_matter_keys.clone());

                let rendered = self
                    .render_translations(&adapter, &document, &languages, &progress, |d| {
                        d.to_markdown()
                    })
                    .await?;

                rendered
                    .into_iter()
                    .map(|(language, markdown)| {
                        let polished = MarkdownPolisher::polish(&markdown);
                        (language, restore_ignored_regions(&polished, &regions))
                    })
                    .collect()
            }
            DocumentType::Json => {
                let document = JsonDocument::parse(&text)?;
                let adapter = JsonAdapter::new(self.key_selector());
                self.render_translations(&adapter, &document, &languages, &progress, |d| {
                    d.to_json()
                })
                .await?
            }
            DocumentType::Yaml => {
                let document = YamlDocument::parse(&text)?;
                let adapter = YamlAdapter::new(self.key_selector());
                self.render_translations(&adapter, &document, &languages, &progress, |d| {
                    d.to_yaml()
                })
                .await?
            }
            DocumentType::Other => {
                progress.finish_and_clear();
                return Ok(ProcessOutcome::Skipped);
            }
        };

        let written = outputs.len();
        for (language, content) in outputs {
            let target = FileManager::output_path(
                &file.relative,
                &self.config.files.output_dir,
                &language,
            );
            FileManager::write_atomic(&target, &content)?;
            debug!("Success: {}", target.display());
        }

        progress.finish_and_clear();
        Ok(ProcessOutcome::Translated(written))
    }

    /// Extract once, then translate and rebuild per language
    async fn render_translations<A: DocumentAdapter>(
        &self,
        adapter: &A,
        document: &A::Document,
        languages: &[String],
        progress: &ProgressBar,
        serialize: impl Fn(&A::Document) -> Result<String, DocumentError>,
    ) -> Result<Vec<(String, String)>> {
        let strings = adapter.extract(document)?;
        let mut outputs = Vec::with_capacity(languages.len());

        for language in languages {
            let sets = self
                .engine
                .translate(&strings, std::slice::from_ref(language))
                .await?;
            let translations = sets
                .get(language)
                .context("Engine returned no translations for the requested language")?;

            let rebuilt = adapter.replace(document, translations)?;
            outputs.push((language.clone(), serialize(&rebuilt)?));
            progress.inc(1);
        }

        Ok(outputs)
    }

    /// Target languages whose output file for this document is missing
    fn pending_languages(&self, file: &SourceFile, force_overwrite: bool) -> Vec<String> {
        self.config
            .target_languages
            .iter()
            .filter(|language| {
                force_overwrite
                    || !FileManager::file_exists(FileManager::output_path(
                        &file.relative,
                        &self.config.files.output_dir,
                        language,
                    ))
            })
            .cloned()
            .collect()
    }

    /// Copy non-document files into each target tree
    fn copy_other_files(&self, others: &[SourceFile], force_overwrite: bool) -> Result<usize> {
        let mut copied = 0;

        for file in others {
            for language in &self.config.target_languages {
                let target = FileManager::output_path(
                    &file.relative,
                    &self.config.files.output_dir,
                    language,
                );
                if !force_overwrite && FileManager::file_exists(&target) {
                    continue;
                }
                FileManager::copy_file(&file.path, &target)?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    fn key_selector(&self) -> KeySelector {
        if self.config.data.translate_all_strings {
            KeySelector::All
        } else {
            KeySelector::Keys(self.config.data.keys.clone())
        }
    }

    fn record_issue(&self, message: &str) {
        if let Err(e) = FileManager::append_to_log_file(PathBuf::from(ISSUES_LOG), message) {
            warn!("Failed to write to {}: {}", ISSUES_LOG, e);
        }
    }

    fn is_quota_error(error: &anyhow::Error) -> bool {
        error.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<ProviderError>(),
                Some(ProviderError::QuotaExceeded(_))
            )
        })
    }

    fn progress_style(units: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
                units
            ))
            .or_else(|_| {
                ProgressStyle::default_bar()
                    .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}")
            })
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
