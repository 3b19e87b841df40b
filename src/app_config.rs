use anyhow::{anyhow, Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

// @module: Application configuration
// Values come from defaults, an optional JSON file, the environment
// (`.env` included) and finally the command line.

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory receiving the generated documents
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Caption languages to look for, most preferred first
    #[serde(default = "default_preferred_languages")]
    pub preferred_languages: Vec<String>,

    /// Language the transcript is translated into (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Paragraph segmentation settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Translation settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Thresholds used when coalescing captions into paragraphs
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct SegmentationConfig {
    /// A silence of at least this many seconds starts a new paragraph
    #[serde(default = "default_max_gap_secs")]
    pub max_gap_secs: f64,

    /// Paragraphs never grow past this many characters by merging
    #[serde(default = "default_max_paragraph_chars")]
    pub max_paragraph_chars: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_gap_secs: default_max_gap_secs(),
            max_paragraph_chars: default_max_paragraph_chars(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Whether translation was requested
    #[serde(default)]
    pub enabled: bool,

    // @field: API key, never written back out
    #[serde(default = "String::new", skip_serializing)]
    pub api_key: String,

    /// Model name (e.g., "gemini-1.5-pro")
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Service endpoint URL
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Delay before a retry, in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Delay between consecutive requests, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            model: default_gemini_model(),
            endpoint: default_gemini_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl TranslationConfig {
    /// Whether a non-blank API key is available
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Pick the API key: explicit value first, then the environment, then
    /// whatever the configuration file provided.
    pub fn resolve_api_key(&mut self, cli_key: Option<&str>, env_key: Option<String>) {
        if let Some(key) = cli_key.filter(|k| !k.trim().is_empty()) {
            debug!("Using Gemini API key from the command line");
            self.api_key = key.trim().to_string();
        } else if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            debug!("Using Gemini API key from the environment");
            self.api_key = key.trim().to_string();
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_preferred_languages() -> Vec<String> {
    vec!["ko".to_string(), "en".to_string(), "ja".to_string()]
}

fn default_target_language() -> String {
    "ko".to_string()
}

fn default_max_gap_secs() -> f64 {
    5.0
}

fn default_max_paragraph_chars() -> usize {
    500
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.8
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_retry_count() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    5000
}

fn default_request_delay_ms() -> u64 {
    1000
}

impl Config {
    /// Load a JSON configuration file, falling back to defaults when the
    /// file does not exist. The file is never created.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let path = path.as_ref();

        if !path.exists() {
            debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.target_language)
            .context("Invalid target language")?;

        if self.preferred_languages.is_empty() {
            return Err(anyhow!("At least one preferred caption language is required"));
        }
        for code in &self.preferred_languages {
            crate::language_utils::validate_language_code(code)
                .with_context(|| format!("Invalid caption language: {}", code))?;
        }

        if !(self.segmentation.max_gap_secs > 0.0) {
            return Err(anyhow!(
                "Paragraph gap threshold must be positive, got {}",
                self.segmentation.max_gap_secs
            ));
        }
        if self.segmentation.max_paragraph_chars == 0 {
            return Err(anyhow!("Paragraph character cap must be positive"));
        }

        if self.translation.model.trim().is_empty() {
            return Err(anyhow!("Translation model name must not be empty"));
        }

        Ok(())
    }

    /// Turn translation off when it cannot run, logging why
    pub fn disable_translation_without_key(&mut self) {
        if self.translation.enabled && !self.translation.has_api_key() {
            warn!("Gemini API key is not set, translation is disabled.");
            warn!(
                "Set {} in the environment or a .env file, or pass --api-key.",
                API_KEY_ENV_VAR
            );
            self.translation.enabled = false;
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            preferred_languages: default_preferred_languages(),
            target_language: default_target_language(),
            segmentation: SegmentationConfig::default(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Load variables from a `.env` file into the process environment.
///
/// An explicit path that does not exist is reported and skipped. Without a
/// path, the first `.env` found from the working directory upward is used.
/// Returns whether a file was loaded.
pub fn load_env_file(path: Option<&Path>) -> Result<bool> {
    match path {
        Some(path) => {
            if !path.exists() {
                warn!(".env file not found: {}", path.display());
                return Ok(false);
            }
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load .env file: {}", path.display()))?;
            debug!("Loaded environment from {}", path.display());
            Ok(true)
        }
        None => match dotenvy::dotenv() {
            Ok(found) => {
                debug!("Loaded environment from {}", found.display());
                Ok(true)
            }
            Err(e) if e.not_found() => Ok(false),
            Err(e) => Err(anyhow!("Failed to load .env file: {}", e)),
        },
    }
}
