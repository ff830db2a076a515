//! OpenAI provider for the legacy completions endpoint.

use async_trait::async_trait;

use super::completions::post_completion;
use crate::inference::{Completion, CompletionProvider, CompletionRequest, ProviderError};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API provider. The API key comes with each request, not at construction.
pub struct OpenAiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new OpenAI provider.
    ///
    /// # Arguments
    /// * `base_url` - Optional custom base URL (defaults to OpenAI's API)
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        if request.api_key.trim().is_empty() {
            return Err(ProviderError::Config("API key is not set".to_string()));
        }
        let key = request.api_key.trim().to_string();
        post_completion(&self.client, &self.base_url, Some(&key), self.name(), request).await
    }
}
