//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use async_trait::async_trait;

use crate::core::conversation::ChatSequences;
use crate::core::state::EditorState;
use crate::inference::{
    Completion, CompletionParameters, CompletionProvider, CompletionRequest, ProviderError,
};

pub const TEST_PROMPT: &str = "The following is a conversation with an AI assistant.\n";

/// A provider that echoes a fixed reply without touching the network.
pub struct NoopProvider;

#[async_trait]
impl CompletionProvider for NoopProvider {
    fn name(&self) -> &str {
        "noop"
    }

    async fn complete(&self, _request: CompletionRequest<'_>) -> Result<Completion, ProviderError> {
        Ok(Completion {
            text: String::new(),
            finish_reason: None,
            usage: None,
        })
    }
}

/// Creates a test state with a NoopProvider and no API key.
pub fn test_state() -> EditorState {
    EditorState::new(
        Arc::new(NoopProvider),
        TEST_PROMPT.to_string(),
        CompletionParameters::default(),
        ChatSequences::default(),
        50,
    )
}

/// Same as [`test_state`] but ready to send.
pub fn test_state_with_key() -> EditorState {
    let mut state = test_state();
    state.api_key = "test-key".to_string();
    state
}
