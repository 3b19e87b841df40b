/*!
 * Error types for the ytscript application.
 *
 * Fetch errors are fatal for a run, translation errors only degrade it.
 * All types use the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when retrieving captions from the video platform
#[derive(Error, Debug)]
pub enum FetchError {
    /// The video has no usable caption track
    #[error("No captions found for video {video_id}: {reason}")]
    NotFound {
        /// Video identifier that was requested
        video_id: String,
        /// Why no track could be used
        reason: String,
    },

    /// Transport failure or non-success HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// The platform refuses to play the video (private, removed, age gated...)
    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable {
        /// Video identifier that was requested
        video_id: String,
        /// Playability status reported by the platform
        reason: String,
    },

    /// A platform response could not be understood
    #[error("Failed to parse caption data: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Quota or rate limit reached
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// No API key was configured for the provider
    #[error("No API key configured for translation")]
    MissingApiKey,

    /// The provider answered without any text
    #[error("Provider returned an empty translation")]
    EmptyResponse,

    /// The number of translated items differs from the number of inputs
    #[error("Expected {expected} translated items, got {actual}")]
    LengthMismatch {
        /// Number of source items
        expected: usize,
        /// Number of translated items
        actual: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration or arguments
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while fetching captions
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    /// Classify an error chain by the typed error it carries, context included
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<AppError>() {
            Ok(app_error) => return app_error,
            Err(error) => error,
        };
        let error = match error.downcast::<FetchError>() {
            Ok(fetch_error) => return Self::Fetch(fetch_error),
            Err(error) => error,
        };
        let error = match error.downcast::<TranslationError>() {
            Ok(translation_error) => return Self::Translation(translation_error),
            Err(error) => error,
        };

        if error.chain().any(|cause| cause.is::<std::io::Error>()) {
            Self::File(format!("{:#}", error))
        } else {
            Self::Unknown(format!("{:#}", error))
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
