#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use ytscript::app_config::{self, Config, API_KEY_ENV_VAR};
use ytscript::app_controller::Controller;
use ytscript::errors::{AppError, FetchError};
use ytscript::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for ytscript
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// ytscript - YouTube transcript documents with optional Korean translation
#[derive(Parser, Debug)]
#[command(name = "ytscript")]
#[command(version)]
#[command(about = "Turn YouTube captions into timestamped and paragraph documents")]
#[command(long_about = "ytscript downloads the captions of a YouTube video, groups them into paragraphs \
and writes a timestamped transcript and a full script as .docx and .txt files.

EXAMPLES:
    ytscript https://youtu.be/dQw4w9WgXcQ          # Write the four documents to ./downloads
    ytscript -o notes dQw4w9WgXcQ                 # Choose the output directory
    ytscript -t https://youtu.be/dQw4w9WgXcQ       # Add a Korean translation (needs GEMINI_API_KEY)
    ytscript -l en -l ja VIDEO_ID                  # Prefer English, then Japanese captions
    ytscript completions zsh > _ytscript           # Generate zsh completions

API KEY:
    Translation uses Google Gemini. The key is taken from --api-key, then the
    GEMINI_API_KEY environment variable (a .env file is loaded first), then
    the optional JSON config file.")]
#[command(args_conflicts_with_subcommands = true)]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// YouTube video URL or ID
    #[arg(value_name = "VIDEO")]
    video: Option<String>,

    /// Directory for the generated documents [default: ./downloads]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Translate the transcript into Korean
    #[arg(short, long)]
    translate: bool,

    /// Gemini API key (overrides GEMINI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// .env file to load instead of searching for one
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Caption language to look for, most preferred first (repeatable) [default: ko en ja]
    #[arg(short, long = "language", value_name = "CODE")]
    languages: Vec<String>,

    /// Gemini model used for translation
    #[arg(long)]
    model: Option<String>,

    /// Optional JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and emoji for a level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", ""),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now().format("%H:%M:%S.%3f");
        let (colour, emoji) = Self::decoration(record.level());
        let _ = writeln!(
            std::io::stderr(),
            "\x1B[{}m{} {}{}\x1B[0m",
            colour,
            now,
            emoji,
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "ytscript", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            match AppError::from(e) {
                AppError::Fetch(FetchError::NotFound { .. }) => error!("No documents were written."),
                AppError::Config(_) => error!("Run 'ytscript --help' for usage."),
                AppError::File(_) => error!("Check that the output directory is writable."),
                _ => {}
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(options: CommandLineOptions) -> Result<()> {
    if let Some(level) = options.log_level.clone() {
        let level: app_config::LogLevel = level.into();
        log::set_max_level((&level).into());
    }

    let video = options
        .video
        .clone()
        .ok_or_else(|| AppError::Config("VIDEO is required (a YouTube URL or video ID)".to_string()))?;

    app_config::load_env_file(options.env_file.as_deref())?;

    let config = build_config(&options)?;
    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;

    if options.log_level.is_none() {
        log::set_max_level((&config.log_level).into());
    }
    debug!(
        "Caption languages: {}, translation: {}",
        config.preferred_languages.join(", "),
        if config.translation.enabled { config.translation.model.as_str() } else { "off" }
    );

    FileManager::ensure_dir(&config.output_dir)?;
    info!("Output directory: {}", config.output_dir.display());

    let controller = Controller::with_config(config)?;
    controller.run(&video).await?;

    Ok(())
}

/// Defaults, then the config file, then the environment, then the command line
fn build_config(options: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_default(options.config.as_ref())?;

    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if !options.languages.is_empty() {
        config.preferred_languages = options.languages.clone();
    }
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if options.translate {
        config.translation.enabled = true;
    }

    config
        .translation
        .resolve_api_key(options.api_key.as_deref(), std::env::var(API_KEY_ENV_VAR).ok());
    config.disable_translation_without_key();

    Ok(config)
}
