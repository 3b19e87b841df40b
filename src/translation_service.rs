use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::gemini::Gemini;
use crate::providers::Provider;

// @module: Translation of transcript texts through an LLM provider

pub(crate) const TEXT_MARKER: &str = "Text to translate:\n";
pub(crate) const TRANSLATION_MARKER: &str = "\n\nTranslation:";

/// Texts shorter than this are passed through untouched
const MIN_TRANSLATABLE_CHARS: usize = 5;

/// Build the translation prompt for one text
pub fn build_prompt(text: &str, source_language: &str, target_language: &str) -> String {
    format!(
        "Please translate the following text from {source} to {target}.\n\
         Maintain the original meaning, tone, and context as closely as possible.\n\
         Ensure the translation is natural and fluent in {target}.\n\n\
         {marker}{text}{end}\n",
        source = source_language,
        target = target_language,
        marker = TEXT_MARKER,
        text = text,
        end = TRANSLATION_MARKER,
    )
}

/// Human readable language name for prompts, falling back to the code
fn prompt_language_name(code: &str) -> String {
    language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string())
}

// @struct: Translation service
pub struct TranslationService<P: Provider = Gemini> {
    // @field: Provider implementation
    provider: P,

    // @field: Configuration
    config: TranslationConfig,
}

impl TranslationService<Gemini> {
    /// Create a Gemini-backed service from the configuration
    pub fn new(config: TranslationConfig) -> Result<Self, TranslationError> {
        if !config.has_api_key() {
            return Err(TranslationError::MissingApiKey);
        }
        let provider = Gemini::from_config(&config);
        Ok(Self { provider, config })
    }
}

impl<P: Provider> TranslationService<P> {
    /// Create a service around an existing provider
    pub fn with_provider(provider: P, config: TranslationConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Check that the provider answers at all
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        self.provider.test_connection().await?;
        Ok(())
    }

    /// Translate one text, retrying failed requests as configured
    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().chars().count() < MIN_TRANSLATABLE_CHARS {
            return Ok(text.to_string());
        }

        let prompt = build_prompt(
            text,
            &prompt_language_name(source_language),
            &prompt_language_name(target_language),
        );

        let mut attempt = 0;
        loop {
            let request = self.provider.prompt_request(&prompt);
            match self.provider.complete(request).await {
                Ok(response) => {
                    let translated = P::extract_text(&response).trim().to_string();
                    if translated.is_empty() {
                        return Err(TranslationError::EmptyResponse);
                    }
                    return Ok(translated);
                }
                Err(e) if attempt < self.config.retry_count => {
                    attempt += 1;
                    warn!(
                        "Translation request failed: {}. Retrying in {} ms ({}/{})",
                        e, self.config.retry_backoff_ms, attempt, self.config.retry_count
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Translate every text in order; see `translate_all_with_progress`
    pub async fn translate_all(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        self.translate_all_with_progress(texts, source_language, target_language, None)
            .await
    }

    /// Translate every text in order, one request at a time.
    ///
    /// The result has exactly one item per input. Blank inputs stay blank
    /// without a request. The first failure aborts the whole batch.
    pub async fn translate_all_with_progress(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<String>, TranslationError> {
        let mut translated = Vec::with_capacity(texts.len());
        let mut sent_any = false;

        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                translated.push(String::new());
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                continue;
            }

            if sent_any && self.config.request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
            }
            debug!("Translating item {}/{}", i + 1, texts.len());

            translated.push(self.translate_text(text, source_language, target_language).await?);
            sent_any = true;

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        info!("Translated {} item(s) to {}", translated.len(), target_language);
        Ok(translated)
    }
}
