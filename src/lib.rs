/*!
 * # ytscript - YouTube transcripts as documents
 *
 * A Rust library that turns the captions of a YouTube video into readable
 * documents, with an optional Korean translation.
 *
 * ## Features
 *
 * - Fetch caption tracks through YouTube's innertube API
 * - Pick a track by language priority (generated, then manual, then any)
 * - Group captions into paragraphs by silence and length
 * - Translate the script and paragraphs with Google Gemini
 * - Write a timestamped transcript and a full script as .docx and .txt
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management and `.env` loading
 * - `subtitle_fetcher`: Caption retrieval and timed-text parsing
 * - `transcript`: Caption entries, paragraph segmentation and the document model
 * - `translation_service`: Prompting, retries and pacing of translations
 * - `providers`: LLM backends (`gemini`, plus a `mock` for tests)
 * - `document_writer`: Rendering to Word and plain text
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities and script detection
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod app_config;
pub mod app_controller;
pub mod document_writer;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod subtitle_fetcher;
pub mod transcript;
pub mod translation_service;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use document_writer::{DocumentWriter, WrittenFiles};
pub use errors::{AppError, FetchError, ProviderError, TranslationError};
pub use language_utils::{detect_language, get_language_name, language_codes_match};
pub use subtitle_fetcher::{CaptionSource, FetchedTranscript, YouTubeFetcher};
pub use transcript::{CaptionEntry, ParagraphBlock, Segmenter, TranscriptDocument};
pub use translation_service::TranslationService;
