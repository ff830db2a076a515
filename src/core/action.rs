//! # Actions
//!
//! Everything that can happen in the editor becomes an `Action`.
//! User types in the prompt? That's `Action::EditPrompt(text)`.
//! The API answers? That's `Action::CompletionSucceeded { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns an `Effect` describing any I/O the caller must perform.
//! No side effects here. The network call happens in the TUI layer.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! A send goes through three steps:
//!
//! ```text
//! SendMessage(id) ──► Effect::SpawnCompletion(job)      (pending)
//!                        │
//!        ┌───────────────┴────────────────┐
//!        ▼                                ▼
//! CompletionSucceeded               CompletionFailed
//! (commit user + generated parts)   (drop optimistic part, keep input, inline error)
//! ```
//!
//! Results carry the `request_id` they were spawned with. A result whose
//! conversation was deleted, or that was superseded, is dropped.

use std::fmt;

use log::{debug, info, warn};

use crate::core::conversation::{Conversation, Part, normalize_conversations};
use crate::core::history::EditGroup;
use crate::core::state::{Document, EditorState, PendingSend};
use crate::inference::CompletionParameters;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    EditPrompt(String),
    EditApiKey(String),
    ToggleApiKeyDialog(bool),
    ToggleParametersDialog(bool),
    EditParameters(CompletionParameters),
    AddConversation,
    DeleteConversation(String),
    UpdateConversationInput {
        conversation_id: String,
        input: String,
    },
    NormalizeConversations,
    SendMessage(String),
    CompletionSucceeded {
        conversation_id: String,
        request_id: u64,
        text: String,
    },
    CompletionFailed {
        conversation_id: String,
        request_id: u64,
        message: String,
    },
    DismissError(String),
    Undo,
    Redo,
    Quit,
}

impl Action {
    /// Short name for logging. Never includes payloads (the API key is one).
    pub fn label(&self) -> &'static str {
        match self {
            Action::EditPrompt(_) => "EditPrompt",
            Action::EditApiKey(_) => "EditApiKey",
            Action::ToggleApiKeyDialog(_) => "ToggleApiKeyDialog",
            Action::ToggleParametersDialog(_) => "ToggleParametersDialog",
            Action::EditParameters(_) => "EditParameters",
            Action::AddConversation => "AddConversation",
            Action::DeleteConversation(_) => "DeleteConversation",
            Action::UpdateConversationInput { .. } => "UpdateConversationInput",
            Action::NormalizeConversations => "NormalizeConversations",
            Action::SendMessage(_) => "SendMessage",
            Action::CompletionSucceeded { .. } => "CompletionSucceeded",
            Action::CompletionFailed { .. } => "CompletionFailed",
            Action::DismissError(_) => "DismissError",
            Action::Undo => "Undo",
            Action::Redo => "Redo",
            Action::Quit => "Quit",
        }
    }
}

/// Everything the TUI needs to run one completion request.
#[derive(Clone, PartialEq)]
pub struct CompletionJob {
    pub conversation_id: String,
    pub request_id: u64,
    pub prompt: String,
    pub parameters: CompletionParameters,
    pub stop: Vec<String>,
    pub api_key: String,
}

impl fmt::Debug for CompletionJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionJob")
            .field("conversation_id", &self.conversation_id)
            .field("request_id", &self.request_id)
            .field("prompt_len", &self.prompt.len())
            .field("model", &self.parameters.model)
            .field("stop", &self.stop)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    SpawnCompletion(CompletionJob),
    /// Abort the in-flight request for this conversation.
    CancelCompletion(String),
}

pub fn update(state: &mut EditorState, action: Action) -> Effect {
    debug!("update: {}", action.label());
    match action {
        Action::EditPrompt(prompt) => {
            state
                .history
                .record(Some(EditGroup::Prompt), |doc| doc.prompt = prompt);
            normalize(state);
            Effect::None
        }
        Action::EditApiKey(key) => {
            state.api_key = key;
            Effect::None
        }
        Action::ToggleApiKeyDialog(visible) => {
            state.api_key_dialog_visible = visible;
            Effect::None
        }
        Action::ToggleParametersDialog(visible) => {
            state.parameters_dialog_visible = visible;
            if !visible {
                state.history.break_group();
            }
            Effect::None
        }
        Action::EditParameters(parameters) => {
            state
                .history
                .record(Some(EditGroup::Parameters), |doc| doc.parameters = parameters);
            normalize(state);
            Effect::None
        }
        Action::AddConversation => {
            let conversation = Conversation::new(
                state.prompt(),
                state.parameters(),
                state.sequences.clone(),
            );
            info!("Added conversation {}", conversation.id);
            state
                .history
                .record(None, |doc| doc.conversations.push(conversation));
            normalize(state);
            Effect::None
        }
        Action::DeleteConversation(id) => {
            let removed = state
                .history
                .record(None, |doc| doc.conversations.retain(|c| c.id != id));
            if !removed {
                warn!("DeleteConversation: no conversation {}", id);
                return Effect::None;
            }
            info!("Deleted conversation {}", id);
            state.errors.remove(&id);
            state.status_message = "Conversation deleted".to_string();
            if state.pending.remove(&id).is_some() {
                info!("Cancelling in-flight send for deleted conversation {}", id);
                return Effect::CancelCompletion(id);
            }
            Effect::None
        }
        Action::UpdateConversationInput {
            conversation_id,
            input,
        } => {
            let group = EditGroup::ConversationInput(conversation_id.clone());
            state.history.record(Some(group), |doc| {
                if let Some(c) = doc
                    .conversations
                    .iter_mut()
                    .find(|c| c.id == conversation_id)
                {
                    c.input = input;
                }
            });
            normalize(state);
            Effect::None
        }
        Action::NormalizeConversations => {
            normalize(state);
            Effect::None
        }
        Action::SendMessage(id) => send_message(state, id),
        Action::CompletionSucceeded {
            conversation_id,
            request_id,
            text,
        } => {
            let Some(pending) = take_pending(state, &conversation_id, request_id) else {
                return Effect::None;
            };
            let Some(conversation) = state.conversation_mut_untracked(&conversation_id) else {
                warn!(
                    "Completion for conversation {} arrived after it was removed",
                    conversation_id
                );
                return Effect::None;
            };
            conversation.discard_unsubmitted();
            if let Some(turn) = pending.user_turn {
                conversation.parts.push(Part::user(turn, true));
            }
            let generated = format!("{}{}", conversation.sequences.start, text);
            conversation.parts.push(Part::generated(generated));
            if conversation.input == pending.input {
                conversation.input.clear();
            }
            info!(
                "Conversation {} now has {} parts",
                conversation_id,
                conversation.parts.len()
            );
            state.status_message = "Response received".to_string();
            Effect::None
        }
        Action::CompletionFailed {
            conversation_id,
            request_id,
            message,
        } => {
            if take_pending(state, &conversation_id, request_id).is_none() {
                return Effect::None;
            }
            if let Some(conversation) = state.conversation_mut_untracked(&conversation_id) {
                conversation.discard_unsubmitted();
            }
            warn!("Send failed for conversation {}: {}", conversation_id, message);
            state.status_message = "Send failed".to_string();
            state.errors.insert(conversation_id, message);
            // No longer frozen. Catch up with prompt edits made during the flight.
            normalize(state);
            Effect::None
        }
        Action::DismissError(id) => {
            state.errors.remove(&id);
            Effect::None
        }
        Action::Undo => {
            let before = state.document().clone();
            if !state.history.undo() {
                state.status_message = "Nothing to undo".to_string();
                return Effect::None;
            }
            // An older snapshot may predate conversations that have since been
            // sent. Those are locked, so they come along.
            restore_locked_conversations(state, &before);
            state.status_message = "Undo".to_string();
            reconcile_after_travel(state, &before)
        }
        Action::Redo => {
            let before = state.document().clone();
            if !state.history.redo() {
                state.status_message = "Nothing to redo".to_string();
                return Effect::None;
            }
            state.status_message = "Redo".to_string();
            reconcile_after_travel(state, &before)
        }
        Action::Quit => Effect::Quit,
    }
}

fn send_message(state: &mut EditorState, id: String) -> Effect {
    if state.conversation(&id).is_none() {
        warn!("SendMessage: no conversation {}", id);
        return Effect::None;
    }
    if state.is_pending(&id) {
        state.status_message = "Still waiting for the previous response".to_string();
        return Effect::None;
    }
    if state.needs_api_key() {
        state.status_message = "Set an API key first (Ctrl+K)".to_string();
        state.api_key_dialog_visible = true;
        return Effect::None;
    }
    let Some(conversation) = state.conversation(&id) else {
        return Effect::None;
    };

    let input = conversation.input.clone();
    let user_turn = conversation.user_turn(&input);
    let prompt = conversation.request_prompt(user_turn.as_deref());
    let parameters = conversation.parameters.clone();
    let stop = conversation.stop_sequences();
    let request_id = state.next_request_id();

    if let (Some(turn), Some(conversation)) = (&user_turn, state.conversation_mut_untracked(&id)) {
        conversation.parts.push(Part::user(turn.clone(), false));
    }
    state.errors.remove(&id);
    state.pending.insert(
        id.clone(),
        PendingSend {
            request_id,
            user_turn,
            input,
        },
    );
    state.history.break_group();
    state.status_message = "Waiting for completion...".to_string();
    info!(
        "Sending conversation {} (request {}, prompt_len={})",
        id,
        request_id,
        prompt.len()
    );

    Effect::SpawnCompletion(CompletionJob {
        conversation_id: id,
        request_id,
        prompt,
        parameters,
        stop,
        api_key: state.api_key.trim().to_string(),
    })
}

/// Removes and returns the pending send if `request_id` is the one in flight.
fn take_pending(state: &mut EditorState, conversation_id: &str, request_id: u64) -> Option<PendingSend> {
    let current = state
        .pending
        .get(conversation_id)
        .is_some_and(|p| p.request_id == request_id);
    if !current {
        warn!(
            "Ignoring stale result for conversation {} (request {})",
            conversation_id, request_id
        );
        return None;
    }
    state.pending.remove(conversation_id)
}

fn normalize(state: &mut EditorState) {
    let pending = &state.pending;
    let Document {
        prompt,
        parameters,
        conversations,
    } = state.history.present_mut();
    let updated = normalize_conversations(conversations, prompt, parameters, |id| {
        pending.contains_key(id)
    });
    if updated > 0 {
        debug!("Normalized {} conversation(s)", updated);
    }
}

/// Re-inserts conversations from `before` that are started or waiting on a send
/// but missing from the restored snapshot. Each lands after its nearest earlier
/// neighbour that survived, so the card order is unchanged.
fn restore_locked_conversations(state: &mut EditorState, before: &Document) {
    let pending = &state.pending;
    let conversations = &mut state.history.present_mut().conversations;
    for (index, prev) in before.conversations.iter().enumerate() {
        let locked = prev.has_started() || pending.contains_key(&prev.id);
        if !locked || conversations.iter().any(|c| c.id == prev.id) {
            continue;
        }
        let at = before.conversations[..index]
            .iter()
            .rev()
            .find_map(|n| conversations.iter().position(|c| c.id == n.id))
            .map_or(0, |p| p + 1);
        debug!("Keeping locked conversation {} across undo", prev.id);
        conversations.insert(at, prev.clone());
    }
}

/// After undo/redo: locked transcripts are never rolled back, and optimistic
/// parts only survive while their send is still in flight. A send whose
/// conversation is no longer in the document (redo of a delete) is cancelled.
fn reconcile_after_travel(state: &mut EditorState, before: &Document) -> Effect {
    let orphaned: Vec<String> = state
        .pending
        .keys()
        .filter(|id| state.conversation(id).is_none())
        .cloned()
        .collect();
    for id in &orphaned {
        state.pending.remove(id);
        state.errors.remove(id);
    }

    let pending = &state.pending;
    for conversation in state.history.present_mut().conversations.iter_mut() {
        if let Some(prev) = before.conversations.iter().find(|c| c.id == conversation.id)
            && (prev.has_started() || pending.contains_key(&prev.id))
        {
            conversation.parts = prev.parts.clone();
            conversation.initial_prompt = prev.initial_prompt.clone();
            conversation.parameters = prev.parameters.clone();
        }
        if !pending.contains_key(&conversation.id) {
            conversation.discard_unsubmitted();
        }
    }
    normalize(state);

    let mut orphaned = orphaned.into_iter();
    let Some(id) = orphaned.next() else {
        return Effect::None;
    };
    // A history step adds or deletes at most one conversation. Extras have no
    // pending entry left, so their results are dropped on arrival.
    for extra in orphaned {
        warn!("Dropping in-flight send for removed conversation {}", extra);
    }
    info!("Cancelling in-flight send for removed conversation {}", id);
    Effect::CancelCompletion(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::PartSource;
    use crate::test_support::{test_state, test_state_with_key};

    fn first_id(state: &EditorState) -> String {
        state.conversations()[0].id.clone()
    }

    fn job(effect: Effect) -> CompletionJob {
        match effect {
            Effect::SpawnCompletion(job) => job,
            other => panic!("Expected SpawnCompletion, got {:?}", other),
        }
    }

    fn type_input(state: &mut EditorState, id: &str, text: &str) {
        update(
            state,
            Action::UpdateConversationInput {
                conversation_id: id.to_string(),
                input: text.to_string(),
            },
        );
    }

    fn succeed(state: &mut EditorState, job: &CompletionJob, text: &str) {
        update(
            state,
            Action::CompletionSucceeded {
                conversation_id: job.conversation_id.clone(),
                request_id: job.request_id,
                text: text.to_string(),
            },
        );
    }

    #[test]
    fn test_edit_prompt_updates_unstarted_previews() {
        let mut state = test_state();
        update(&mut state, Action::AddConversation);
        update(&mut state, Action::EditPrompt("New prompt".into()));

        assert_eq!(state.prompt(), "New prompt");
        for c in state.conversations() {
            assert_eq!(c.initial_prompt, "New prompt");
            assert_eq!(c.preview(), "New prompt\nPerson: ");
        }
    }

    #[test]
    fn test_edit_prompt_never_touches_started_conversation() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let original_prompt = state.prompt().to_string();
        type_input(&mut state, &id, "Hi");
        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        succeed(&mut state, &j, " Hello!");

        update(&mut state, Action::EditPrompt("Changed".into()));

        let c = state.conversation(&id).unwrap();
        assert_eq!(c.initial_prompt, original_prompt);
        assert_eq!(
            c.transcript(),
            format!("{}\nPerson: Hi\nAI: Hello!", original_prompt)
        );
    }

    #[test]
    fn test_edit_parameters_propagates_until_started() {
        let mut state = test_state();
        let params = CompletionParameters {
            temperature: 0.3,
            ..state.parameters().clone()
        };
        update(&mut state, Action::EditParameters(params));
        assert_eq!(state.conversations()[0].parameters.temperature, 0.3);
    }

    #[test]
    fn test_api_key_and_prompt_are_independent() {
        let mut state = test_state();
        let prompt = state.prompt().to_string();
        update(&mut state, Action::EditApiKey("sk-123".into()));
        assert_eq!(state.prompt(), prompt);
        assert!(!state.history.can_undo());

        update(&mut state, Action::EditPrompt("other".into()));
        assert_eq!(state.api_key, "sk-123");
    }

    #[test]
    fn test_toggle_dialogs() {
        let mut state = test_state();
        update(&mut state, Action::ToggleApiKeyDialog(true));
        assert!(state.api_key_dialog_visible);
        update(&mut state, Action::ToggleApiKeyDialog(false));
        assert!(!state.api_key_dialog_visible);
        update(&mut state, Action::ToggleParametersDialog(true));
        assert!(state.parameters_dialog_visible);
    }

    #[test]
    fn test_add_and_delete_conversation() {
        let mut state = test_state();
        update(&mut state, Action::AddConversation);
        update(&mut state, Action::AddConversation);
        let ids: Vec<String> = state.conversations().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids.len(), 3);

        update(&mut state, Action::DeleteConversation(ids[1].clone()));
        let remaining: Vec<&str> = state.conversations().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(remaining, vec![ids[0].as_str(), ids[2].as_str()]);
    }

    #[test]
    fn test_delete_unknown_conversation_is_noop() {
        let mut state = test_state();
        let effect = update(&mut state, Action::DeleteConversation("missing".into()));
        assert_eq!(effect, Effect::None);
        assert_eq!(state.conversations().len(), 1);
        assert!(!state.history.can_undo());
    }

    #[test]
    fn test_send_without_api_key_opens_dialog() {
        let mut state = test_state();
        let id = first_id(&state);
        let effect = update(&mut state, Action::SendMessage(id.clone()));
        assert_eq!(effect, Effect::None);
        assert!(state.api_key_dialog_visible);
        assert!(!state.is_pending(&id));
    }

    #[test]
    fn test_send_with_no_parts_uses_initial_prompt() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let prompt = state.prompt().to_string();
        assert_eq!(state.conversation(&id).unwrap().transcript(), prompt);

        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        assert_eq!(j.prompt, format!("{}\nAI:", prompt));
        assert_eq!(j.api_key, "test-key");
        assert_eq!(j.stop, vec!["Person:"]);

        succeed(&mut state, &j, " Hi there.");
        let c = state.conversation(&id).unwrap();
        assert_eq!(c.parts.len(), 1);
        assert_eq!(c.parts[0].source, PartSource::Generated);
        assert_eq!(c.transcript(), format!("{}{}", prompt, c.parts[0].text));
        assert!(c.has_started());
    }

    #[test]
    fn test_send_with_input_adds_optimistic_part_then_commits() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        type_input(&mut state, &id, "What's up?");

        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        assert!(j.prompt.ends_with("\nPerson: What's up?\nAI:"));
        {
            let c = state.conversation(&id).unwrap();
            assert_eq!(c.parts.len(), 1);
            assert!(!c.parts[0].submitted);
            assert!(!c.has_started());
        }

        succeed(&mut state, &j, " Not much.");
        let c = state.conversation(&id).unwrap();
        assert_eq!(c.parts.len(), 2);
        assert!(c.parts.iter().all(|p| p.submitted));
        assert_eq!(c.parts[0].text, "\nPerson: What's up?");
        assert_eq!(c.parts[1].text, "\nAI: Not much.");
        assert!(c.input.is_empty());
        assert!(!state.is_pending(&id));
    }

    #[test]
    fn test_prompt_edit_during_first_send_does_not_leak() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let original = state.prompt().to_string();
        let j = job(update(&mut state, Action::SendMessage(id.clone())));

        update(&mut state, Action::EditPrompt("edited mid-flight".into()));
        assert_eq!(state.conversation(&id).unwrap().initial_prompt, original);

        succeed(&mut state, &j, " ok");
        assert!(state.conversation(&id).unwrap().transcript().starts_with(&original));
    }

    #[test]
    fn test_failed_send_leaves_conversation_unchanged() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        type_input(&mut state, &id, "Hello?");
        let before = state.conversation(&id).unwrap().clone();

        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        update(
            &mut state,
            Action::CompletionFailed {
                conversation_id: id.clone(),
                request_id: j.request_id,
                message: "network error: refused".into(),
            },
        );

        assert_eq!(state.conversation(&id).unwrap(), &before);
        assert_eq!(
            state.errors.get(&id).map(String::as_str),
            Some("network error: refused")
        );
        assert!(!state.is_pending(&id));
    }

    #[test]
    fn test_failed_first_send_catches_up_with_prompt() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        update(&mut state, Action::EditPrompt("edited mid-flight".into()));

        update(
            &mut state,
            Action::CompletionFailed {
                conversation_id: id.clone(),
                request_id: j.request_id,
                message: "boom".into(),
            },
        );
        assert_eq!(
            state.conversation(&id).unwrap().initial_prompt,
            "edited mid-flight"
        );
    }

    #[test]
    fn test_retry_after_failure_clears_error() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        update(
            &mut state,
            Action::CompletionFailed {
                conversation_id: id.clone(),
                request_id: j.request_id,
                message: "boom".into(),
            },
        );
        let retry = job(update(&mut state, Action::SendMessage(id.clone())));
        assert!(retry.request_id > j.request_id);
        assert!(!state.errors.contains_key(&id));
    }

    #[test]
    fn test_concurrent_send_rejected() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let _ = job(update(&mut state, Action::SendMessage(id.clone())));
        let second = update(&mut state, Action::SendMessage(id.clone()));
        assert_eq!(second, Effect::None);
    }

    #[test]
    fn test_delete_pending_conversation_cancels_and_ignores_result() {
        let mut state = test_state_with_key();
        update(&mut state, Action::AddConversation);
        let id = first_id(&state);
        let j = job(update(&mut state, Action::SendMessage(id.clone())));

        let effect = update(&mut state, Action::DeleteConversation(id.clone()));
        assert_eq!(effect, Effect::CancelCompletion(id.clone()));

        let snapshot = state.document().clone();
        succeed(&mut state, &j, " too late");
        assert_eq!(state.document(), &snapshot);
    }

    #[test]
    fn test_stale_request_id_ignored() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        update(
            &mut state,
            Action::CompletionSucceeded {
                conversation_id: id.clone(),
                request_id: j.request_id + 100,
                text: "wrong".into(),
            },
        );
        assert!(state.is_pending(&id));
        assert!(state.conversation(&id).unwrap().parts.is_empty());
    }

    #[test]
    fn test_input_typed_during_flight_is_kept() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        type_input(&mut state, &id, "first");
        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        type_input(&mut state, &id, "second");
        succeed(&mut state, &j, " reply");
        assert_eq!(state.conversation(&id).unwrap().input, "second");
    }

    #[test]
    fn test_undo_redo_prompt_edit() {
        let mut state = test_state();
        let original = state.prompt().to_string();
        update(&mut state, Action::EditPrompt("a".into()));
        update(&mut state, Action::EditPrompt("ab".into()));

        update(&mut state, Action::Undo);
        assert_eq!(state.prompt(), original);
        assert_eq!(state.conversations()[0].initial_prompt, original);

        update(&mut state, Action::Redo);
        assert_eq!(state.prompt(), "ab");
        assert_eq!(state.conversations()[0].initial_prompt, "ab");
    }

    #[test]
    fn test_undo_restores_deleted_conversation() {
        let mut state = test_state();
        update(&mut state, Action::AddConversation);
        let id = state.conversations()[1].id.clone();
        update(&mut state, Action::DeleteConversation(id.clone()));
        assert!(state.conversation(&id).is_none());
        update(&mut state, Action::Undo);
        assert!(state.conversation(&id).is_some());
    }

    #[test]
    fn test_undo_does_not_roll_back_transcript() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        update(&mut state, Action::EditPrompt("P1".into()));
        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        succeed(&mut state, &j, " reply");

        update(&mut state, Action::Undo);

        let c = state.conversation(&id).unwrap();
        assert!(c.has_started());
        assert_eq!(c.initial_prompt, "P1");
        assert_ne!(state.prompt(), "P1");
    }

    #[test]
    fn test_undoing_add_keeps_started_conversation() {
        let mut state = test_state_with_key();
        update(&mut state, Action::AddConversation);
        let id = state.conversations()[1].id.clone();
        let j = job(update(&mut state, Action::SendMessage(id.clone())));
        succeed(&mut state, &j, " reply");
        let transcript = state.conversation(&id).unwrap().transcript();

        update(&mut state, Action::Undo);
        update(&mut state, Action::EditPrompt("P2".into()));
        update(&mut state, Action::Redo);

        assert_eq!(state.conversations().len(), 2);
        assert_eq!(state.conversations()[1].id, id);
        assert_eq!(state.conversations()[1].transcript(), transcript);
    }

    #[test]
    fn test_undoing_add_keeps_in_flight_conversation() {
        let mut state = test_state_with_key();
        update(&mut state, Action::AddConversation);
        let id = state.conversations()[1].id.clone();
        let j = job(update(&mut state, Action::SendMessage(id.clone())));

        assert_eq!(update(&mut state, Action::Undo), Effect::None);
        assert!(state.conversation(&id).is_some());
        assert!(state.is_pending(&id));

        succeed(&mut state, &j, " reply");
        assert!(state.conversation(&id).unwrap().has_started());
    }

    #[test]
    fn test_redoing_delete_cancels_in_flight_send() {
        let mut state = test_state_with_key();
        update(&mut state, Action::AddConversation);
        let id = state.conversations()[1].id.clone();
        update(&mut state, Action::DeleteConversation(id.clone()));
        update(&mut state, Action::Undo);
        let _ = job(update(&mut state, Action::SendMessage(id.clone())));

        let effect = update(&mut state, Action::Redo);
        assert_eq!(effect, Effect::CancelCompletion(id.clone()));
        assert!(state.conversation(&id).is_none());
        assert!(!state.is_pending(&id));
    }

    #[test]
    fn test_undo_with_empty_history() {
        let mut state = test_state();
        update(&mut state, Action::Undo);
        assert_eq!(state.status_message, "Nothing to undo");
        update(&mut state, Action::Redo);
        assert_eq!(state.status_message, "Nothing to redo");
    }

    #[test]
    fn test_dismiss_error() {
        let mut state = test_state();
        state.errors.insert("x".into(), "oops".into());
        update(&mut state, Action::DismissError("x".into()));
        assert!(state.errors.is_empty());
    }

    #[test]
    fn test_quit() {
        let mut state = test_state();
        assert_eq!(update(&mut state, Action::Quit), Effect::Quit);
    }

    #[test]
    fn test_job_debug_redacts_key() {
        let mut state = test_state_with_key();
        let id = first_id(&state);
        let j = job(update(&mut state, Action::SendMessage(id)));
        let rendered = format!("{:?}", j);
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
