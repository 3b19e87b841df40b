/*!
 * LLM backends used for translation.
 *
 * - `gemini`: Google Generative Language API
 * - `mock`: scripted in-process backend for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// A text-completion backend.
///
/// Each backend keeps its own wire types; the translation service only
/// builds a request from a prompt, sends it and reads the text back.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    type Request: Send + Sync;
    type Response: Send + Sync;

    /// Request carrying a single user prompt
    fn prompt_request(&self, prompt: &str) -> Self::Request;

    /// Send a request and wait for the answer
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Cheap round trip to check reachability and credentials
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Generated text of a response, empty when there is none
    fn extract_text(response: &Self::Response) -> String;
}

pub mod gemini;
pub mod mock;
