// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use yadtwai::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};
use yadtwai::app_controller::Controller;
use yadtwai::memory::{SqliteMemory, TranslationStore};
use yadtwai::translation::TranslationMode;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Deepl,
    Openai,
    Ollama,
    Lmstudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Deepl => TranslationProvider::DeepL,
            CliTranslationProvider::Openai => TranslationProvider::OpenAI,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::Lmstudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the configured documentation tree (default command)
    Translate(TranslateArgs),

    /// Inspect the translation memory
    Memory {
        #[command(subcommand)]
        command: MemoryCommands,
    },

    /// Generate shell completions for yadtwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum MemoryCommands {
    /// Show entry counts, hit counts and size of the translation memory
    Stats {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Source directory containing the documents to translate
    #[arg(short = 'd', long)]
    source_dir: Option<PathBuf>,

    /// Output directory pattern; $langcode$ is replaced per language
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Translation mode: offline, online or hybrid
    #[arg(long, default_value = "hybrid")]
    mode: TranslationMode,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language codes, comma separated (e.g., 'fr,es,pt-BR')
    #[arg(short, long, value_delimiter = ',')]
    target_languages: Option<Vec<String>>,

    /// Number of memory misses buffered before a provider call
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// yadtwai - Yet Another Documentation Translator with AI
///
/// Translates documentation trees (markdown, MDX, JSON, YAML) into multiple
/// languages, backed by a persistent translation memory.
#[derive(Parser, Debug)]
#[command(name = "yadtwai")]
#[command(author = "yadtwai Team")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered documentation translation tool")]
#[command(long_about = "yadtwai translates documentation trees (markdown, MDX, JSON, YAML) into multiple languages, reusing previous work through a persistent translation memory.

EXAMPLES:
    yadtwai                                     # Translate using default config
    yadtwai -f                                  # Force overwrite existing outputs
    yadtwai -p deepl -t fr,es,de                # DeepL into French, Spanish and German
    yadtwai -p ollama -m llama3.1               # Use a local Ollama model
    yadtwai --mode offline                      # Reuse the translation memory only
    yadtwai -d docs -o 'i18n/$langcode$'        # Custom source and output trees
    yadtwai memory stats                        # Inspect the translation memory
    yadtwai completions bash > yadtwai.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically. Command line options override the file.

SUPPORTED PROVIDERS:
    deepl     - DeepL API (requires API key, default)
    openai    - OpenAI API (requires API key)
    ollama    - Local Ollama server (default: llama3.1)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Source directory containing the documents to translate
    #[arg(short = 'd', long)]
    source_dir: Option<PathBuf>,

    /// Output directory pattern; $langcode$ is replaced per language
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Translation mode: offline, online or hybrid
    #[arg(long, default_value = "hybrid")]
    mode: TranslationMode,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language codes, comma separated (e.g., 'fr,es,pt-BR')
    #[arg(short, long, value_delimiter = ',')]
    target_languages: Option<Vec<String>>,

    /// Number of memory misses buffered before a provider call
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> u8 {
        match level {
            Level::Error => 31,
            Level::Warn => 33,
            Level::Info => 32,
            Level::Debug => 36,
            Level::Trace => 35,
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[1;{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yadtwai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Memory { command }) => run_memory(command).await,
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args so a bare `yadtwai` translates
            let translate_args = TranslateArgs {
                config_path: cli.config_path,
                source_dir: cli.source_dir,
                output_dir: cli.output_dir,
                mode: cli.mode,
                provider: cli.provider,
                model: cli.model,
                source_language: cli.source_language,
                target_languages: cli.target_languages,
                batch_size: cli.batch_size,
                force_overwrite: cli.force_overwrite,
                log_level: cli.log_level,
            };
            run_translate(translate_args).await
        }
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        match config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config =
                    ProviderConfig::new(config.translation.provider.clone());
                provider_config.model = model.clone();
                config.translation.available_providers.push(provider_config);
            }
        }
    }

    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }

    if let Some(target_languages) = &options.target_languages {
        config.target_languages = target_languages
            .iter()
            .map(|language| language.trim().to_string())
            .filter(|language| !language.is_empty())
            .collect();
    }

    if let Some(source_dir) = &options.source_dir {
        config.files.source_dir = source_dir.clone();
    }

    if let Some(output_dir) = &options.output_dir {
        config.files.output_dir = output_dir.clone();
    }

    if let Some(batch_size) = options.batch_size {
        config.translation.common.batch_size = batch_size;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::new(config, options.mode)?;
    controller.run(options.force_overwrite).await
}

async fn run_memory(command: MemoryCommands) -> Result<()> {
    match command {
        MemoryCommands::Stats { config_path } => {
            // A missing config file means default paths; don't create one
            // just to read stats
            let config = if Path::new(&config_path).exists() {
                load_or_create_config(&config_path)?
            } else {
                Config::default()
            };

            let memory = SqliteMemory::open(&config.memory.path)?;
            let stats = memory.stats().await?;
            println!("{}", stats);

            Ok(())
        }
    }
}

/// Load the configuration file, or write and return the defaults when it
/// does not exist yet
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        Ok(config)
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}
