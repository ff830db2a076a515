use std::fmt;

use async_trait::async_trait;

use super::types::{Completion, CompletionParameters};

/// Why a completion request failed. The `Display` text is shown inline on the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Missing API key or unusable base URL. Caught before any request is sent.
    Config(String),
    /// The server was unreachable or the request timed out.
    Network(String),
    /// Non-2xx response. `message` is the API's own error text when it sent one.
    Api { status: u16, message: String },
    /// Body was not a completion (bad JSON, no choices).
    Parse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub parameters: &'a CompletionParameters,
    pub stop: &'a [String],
    /// Bearer credential. Held by the editor state, so it travels with each request.
    pub api_key: &'a str,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Whether requests need a non-empty API key.
    fn requires_api_key(&self) -> bool {
        true
    }

    /// Sends the prompt and waits for the whole completion.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, ProviderError>;
}
