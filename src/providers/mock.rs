/*!
 * In-process provider for tests.
 *
 * Answers without touching the network. The "translation" is the source
 * text tagged with `[KO]`, unless a custom generator is installed:
 * - `MockProvider::working()` answers every request
 * - `MockProvider::intermittent(n)` rejects every nth request with a 503
 * - `MockProvider::failing()` rejects everything with a 500
 * - `MockProvider::quota_exceeded()` rejects everything with a rate limit
 * - `MockProvider::empty()` answers with no text at all
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation_service::{TEXT_MARKER, TRANSLATION_MARKER};

/// Recover the text embedded by `build_prompt`; other prompts are returned trimmed
fn source_text_from_prompt(prompt: &str) -> &str {
    let Some(start) = prompt.find(TEXT_MARKER).map(|i| i + TEXT_MARKER.len()) else {
        return prompt.trim();
    };
    let body = &prompt[start..];
    match body.rfind(TRANSLATION_MARKER) {
        Some(end) => &body[..end],
        None => body.trim(),
    }
}

#[derive(Debug, Clone)]
pub struct MockRequest {
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub text: String,
}

/// How the mock answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Working,
    /// Request number `k * fail_every` (1-based) is rejected
    Intermittent { fail_every: usize },
    Failing,
    QuotaExceeded,
    Empty,
}

/// Scripted stand-in for a real LLM backend
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Shared between clones so a test can inspect traffic after handing a clone away
    requests: Arc<AtomicUsize>,
    generator: Option<fn(&str) -> String>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            requests: Arc::new(AtomicUsize::new(0)),
            generator: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn quota_exceeded() -> Self {
        Self::new(MockBehavior::QuotaExceeded)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Replace the `[KO]` tagging; the generator receives the source text
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Requests received so far, across clones
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn answer(&self, prompt: &str) -> MockResponse {
        let source = source_text_from_prompt(prompt);
        let text = match self.generator {
            Some(generate) => generate(source),
            None => format!("[KO] {}", source),
        };
        MockResponse { text }
    }

    fn rejection(&self, request_number: usize) -> Option<ProviderError> {
        match self.behavior {
            MockBehavior::Working | MockBehavior::Empty => None,
            MockBehavior::Intermittent { fail_every } if request_number % fail_every == 0 => {
                Some(ProviderError::ApiError {
                    status_code: 503,
                    message: format!("mock outage on request {}", request_number),
                })
            }
            MockBehavior::Intermittent { .. } => None,
            MockBehavior::Failing => Some(ProviderError::ApiError {
                status_code: 500,
                message: "mock provider is down".to_string(),
            }),
            MockBehavior::QuotaExceeded => Some(ProviderError::RateLimitExceeded(
                "Resource has been exhausted (e.g. check quota).".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    fn prompt_request(&self, prompt: &str) -> MockRequest {
        MockRequest {
            prompt: prompt.to_string(),
        }
    }

    async fn complete(&self, request: MockRequest) -> Result<MockResponse, ProviderError> {
        let request_number = self.requests.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(err) = self.rejection(request_number) {
            return Err(err);
        }
        if self.behavior == MockBehavior::Empty {
            return Ok(MockResponse { text: String::new() });
        }

        Ok(self.answer(&request.prompt))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        if self.behavior == MockBehavior::Failing {
            return Err(ProviderError::ConnectionError("mock provider is down".to_string()));
        }
        Ok(())
    }

    fn extract_text(response: &MockResponse) -> String {
        response.text.clone()
    }
}
