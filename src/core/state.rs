//! # Editor State
//!
//! All application state in one place. Presentation state lives in the `tui` module.
//!
//! ```text
//! EditorState
//! ├── provider: Arc<dyn CompletionProvider>   // completion backend
//! ├── history: History<Document>              // undoable slice
//! │   └── Document
//! │       ├── prompt: String
//! │       ├── parameters: CompletionParameters
//! │       └── conversations: Vec<Conversation>
//! ├── api_key: String                         // plaintext, client-held
//! ├── api_key_dialog_visible: bool
//! ├── parameters_dialog_visible: bool
//! ├── sequences: ChatSequences                // markers for new conversations
//! ├── pending: HashMap<id, PendingSend>       // in-flight sends
//! ├── errors: HashMap<id, String>             // inline send errors
//! └── status_message: String
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::config::ResolvedConfig;
use crate::core::conversation::{ChatSequences, Conversation};
use crate::core::history::History;
use crate::inference::{CompletionParameters, CompletionProvider};

/// The undoable part of the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub prompt: String,
    pub parameters: CompletionParameters,
    pub conversations: Vec<Conversation>,
}

/// A send that has been dispatched but not resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub request_id: u64,
    /// The user part to commit on success, if the input wasn't blank.
    pub user_turn: Option<String>,
    /// The raw input at send time, so the reply box is only cleared if untouched.
    pub input: String,
}

pub struct EditorState {
    pub provider: Arc<dyn CompletionProvider>,
    pub history: History<Document>,
    pub api_key: String,
    pub api_key_dialog_visible: bool,
    pub parameters_dialog_visible: bool,
    pub sequences: ChatSequences,
    pub pending: HashMap<String, PendingSend>,
    pub errors: HashMap<String, String>,
    pub status_message: String,
    next_request_id: u64,
}

impl EditorState {
    /// Creates a state holding `prompt` and one empty conversation.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        prompt: String,
        parameters: CompletionParameters,
        sequences: ChatSequences,
        history_limit: usize,
    ) -> Self {
        let first = Conversation::new(&prompt, &parameters, sequences.clone());
        let document = Document {
            prompt,
            parameters,
            conversations: vec![first],
        };
        Self {
            provider,
            history: History::new(document, history_limit),
            api_key: String::new(),
            api_key_dialog_visible: false,
            parameters_dialog_visible: false,
            sequences,
            pending: HashMap::new(),
            errors: HashMap::new(),
            status_message: String::from("Welcome to Prompts!"),
            next_request_id: 1,
        }
    }

    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &ResolvedConfig) -> Self {
        let mut state = Self::new(
            provider,
            config.prompt.clone(),
            config.parameters.clone(),
            config.sequences.clone(),
            config.history_limit,
        );
        state.api_key = config.api_key.clone().unwrap_or_default();
        state
    }

    pub fn document(&self) -> &Document {
        self.history.present()
    }

    pub fn prompt(&self) -> &str {
        &self.document().prompt
    }

    pub fn parameters(&self) -> &CompletionParameters {
        &self.document().parameters
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.document().conversations
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations().iter().find(|c| c.id == id)
    }

    pub(crate) fn conversation_mut_untracked(&mut self, id: &str) -> Option<&mut Conversation> {
        self.history
            .present_mut()
            .conversations
            .iter_mut()
            .find(|c| c.id == id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    pub fn needs_api_key(&self) -> bool {
        self.provider.requires_api_key() && self.api_key.trim().is_empty()
    }

    pub(crate) fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }
}
