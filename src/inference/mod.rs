pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
pub use providers::{LmStudioProvider, OpenAiProvider};
pub use types::{Completion, CompletionParameters, MAX_STOP_SEQUENCES, Parameter, Usage};
