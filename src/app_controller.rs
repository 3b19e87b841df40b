use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::document_writer::{DocumentWriter, WrittenFiles};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::Provider;
use crate::subtitle_fetcher::{extract_video_id, is_plausible_video_id, CaptionSource, YouTubeFetcher};
use crate::transcript::{has_meaningful_content, Segmenter, TranscriptDocument, MIN_SCRIPT_CHARS};
use crate::translation_service::TranslationService;

// @module: Application controller for transcript generation

/// Drives one video from captions to written documents
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole workflow against YouTube and, when enabled, Gemini
    pub async fn run(&self, video_input: &str) -> Result<WrittenFiles> {
        let fetcher = YouTubeFetcher::new();

        if !self.config.translation.enabled {
            return self
                .run_with(video_input, &fetcher, None::<&TranslationService>)
                .await;
        }

        match TranslationService::new(self.config.translation.clone()) {
            Ok(translator) => self.run_with(video_input, &fetcher, Some(&translator)).await,
            Err(e) => {
                warn!("Translation unavailable: {}", e);
                self.run_with(video_input, &fetcher, None::<&TranslationService>)
                    .await
            }
        }
    }

    /// Run the workflow with explicit caption and translation backends
    pub async fn run_with<S, P>(
        &self,
        video_input: &str,
        source: &S,
        translator: Option<&TranslationService<P>>,
    ) -> Result<WrittenFiles>
    where
        S: CaptionSource,
        P: Provider,
    {
        let start_time = Instant::now();

        let video_id = extract_video_id(video_input)
            .ok_or_else(|| anyhow!("A YouTube video URL or ID is required"))?;
        if !is_plausible_video_id(&video_id) {
            warn!("'{}' does not look like a YouTube video ID", video_id);
        }
        info!("Processing video {}", video_id);

        let spinner = Self::spinner(format!("Fetching captions for {}", video_id));
        let fetched = source.fetch(&video_id, &self.config.preferred_languages).await;
        spinner.finish_and_clear();
        let fetched = fetched.with_context(|| format!("Failed to fetch captions for {}", video_id))?;

        info!(
            "Fetched {} caption entries ({}) for '{}'",
            fetched.entries.len(),
            fetched.language_code,
            fetched.title
        );
        if !has_meaningful_content(&fetched.entries) {
            warn!("Captions contain very little text, documents may be mostly empty");
        }

        let segmenter = Segmenter::new(self.config.segmentation);
        let mut document =
            TranscriptDocument::build(fetched.title, fetched.video_id, fetched.entries, &segmenter);
        debug!(
            "Segmented into {} paragraph(s), {} characters",
            document.paragraphs.len(),
            document.full_script.chars().count()
        );

        if let Some(translator) = translator {
            self.translate_document(&mut document, translator).await;
        } else {
            debug!("Translation not requested");
        }

        let writer = DocumentWriter::new(&self.config.output_dir);
        let files = writer.write(&document)?;

        for path in files.all() {
            info!("Saved {}", path.display());
        }
        info!("Done in {:.1}s", start_time.elapsed().as_secs_f64());

        Ok(files)
    }

    /// Fill in the translated fields; failures only cost the translation
    async fn translate_document<P: Provider>(
        &self,
        document: &mut TranscriptDocument,
        translator: &TranslationService<P>,
    ) {
        let target = self.config.target_language.as_str();
        let source_language = language_utils::detect_language(&document.refined_script);

        if language_utils::language_codes_match(source_language, target) {
            info!("Captions are already in '{}', skipping translation", target);
            return;
        }
        if document.refined_script.trim().chars().count() <= MIN_SCRIPT_CHARS {
            info!("Script is too short to translate, skipping translation");
            return;
        }

        let inputs = document.translation_inputs();
        info!(
            "Translating {} text(s) from '{}' to '{}'",
            inputs.len(),
            source_language,
            target
        );

        let progress = Self::progress_bar(inputs.len() as u64);
        let result = translator
            .translate_all_with_progress(&inputs, source_language, target, Some(&progress))
            .await;
        progress.finish_and_clear();

        match result {
            Ok(translated) => {
                let actual = translated.len();
                if !document.apply_translations(translated) {
                    let e = TranslationError::LengthMismatch {
                        expected: inputs.len(),
                        actual,
                    };
                    warn!("{}, continuing without translation", e);
                }
            }
            Err(e) => warn!("Translation failed, continuing without translation: {}", e),
        }
    }

    fn spinner(message: String) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn progress_bar(len: u64) -> ProgressBar {
        let progress_bar = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} texts ({percent}%) {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }
}
