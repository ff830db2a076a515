//! LM Studio provider.
//!
//! LM Studio serves an OpenAI-compatible `/v1/completions` endpoint for
//! local models. No bearer credential is sent.

use async_trait::async_trait;

use super::completions::post_completion;
use crate::inference::{Completion, CompletionProvider, CompletionRequest, ProviderError};

pub const DEFAULT_LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

/// LM Studio API provider (local inference server)
pub struct LmStudioProvider {
    base_url: String,
    client: reqwest::Client,
}

impl LmStudioProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_LMSTUDIO_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for LmStudioProvider {
    fn name(&self) -> &str {
        "lmstudio"
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        post_completion(&self.client, &self.base_url, None, self.name(), request).await
    }
}
