//! # Event Routing
//!
//! Turns one `TuiEvent` into the core `Action`s it implies, updating
//! TUI-local state (focus, editor buffers, scroll) along the way.
//!
//! Priority, highest first:
//!
//! 1. Ctrl+C always quits
//! 2. An open dialog takes every other event
//! 3. Global shortcuts (undo, add/delete, dialogs, focus, scroll)
//! 4. The focused editor (prompt, or the selected conversation's reply box)
//!
//! Routing reads `EditorState` but never mutates it. The caller feeds the
//! returned actions to `update()` and then calls [`TuiState::sync`].

use crate::core::action::Action;
use crate::core::state::EditorState;
use crate::tui::TuiState;
use crate::tui::component::EventHandler;
use crate::tui::components::{ApiKeyDialogEvent, ParametersDialogEvent, TextEditorEvent};
use crate::tui::event::TuiEvent;

/// Which editor receives text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    /// Index into `EditorState::conversations()`
    Conversation(usize),
}

impl Focus {
    /// Tab order: prompt, then each conversation, then back to the prompt.
    fn next(self, count: usize) -> Focus {
        match self {
            Focus::Prompt if count > 0 => Focus::Conversation(0),
            Focus::Conversation(i) if i + 1 < count => Focus::Conversation(i + 1),
            _ => Focus::Prompt,
        }
    }

    fn prev(self, count: usize) -> Focus {
        match self {
            Focus::Prompt if count > 0 => Focus::Conversation(count - 1),
            Focus::Conversation(i) if i > 0 => Focus::Conversation(i - 1),
            _ => Focus::Prompt,
        }
    }

    /// Keep a conversation index valid after the list shrinks.
    pub fn clamp(self, count: usize) -> Focus {
        match self {
            Focus::Conversation(_) if count == 0 => Focus::Prompt,
            Focus::Conversation(i) => Focus::Conversation(i.min(count - 1)),
            Focus::Prompt => Focus::Prompt,
        }
    }
}

pub fn route_event(state: &EditorState, tui: &mut TuiState, event: &TuiEvent) -> Vec<Action> {
    if matches!(event, TuiEvent::ForceQuit) {
        return vec![Action::Quit];
    }

    if state.api_key_dialog_visible {
        return match tui.api_key_dialog.handle_event(event) {
            Some(ApiKeyDialogEvent::Changed) => {
                vec![Action::EditApiKey(tui.api_key_dialog.key().to_string())]
            }
            Some(ApiKeyDialogEvent::Dismiss) => vec![Action::ToggleApiKeyDialog(false)],
            None => Vec::new(),
        };
    }

    if state.parameters_dialog_visible {
        return match tui.parameters_dialog.handle_event(event) {
            Some(ParametersDialogEvent::Adjust(param, steps)) => {
                vec![Action::EditParameters(state.parameters().adjusted(param, steps))]
            }
            Some(ParametersDialogEvent::Dismiss) => vec![Action::ToggleParametersDialog(false)],
            None => Vec::new(),
        };
    }

    let count = state.conversations().len();
    let focused_id = match tui.focus {
        Focus::Conversation(i) => state.conversations().get(i).map(|c| c.id.clone()),
        Focus::Prompt => None,
    };

    match event {
        TuiEvent::Undo => return vec![Action::Undo],
        TuiEvent::Redo => return vec![Action::Redo],
        TuiEvent::AddConversation => {
            // Appended, so it lands at the current length
            tui.set_focus(Focus::Conversation(count));
            return vec![Action::AddConversation];
        }
        TuiEvent::DeleteConversation => {
            return focused_id
                .map(|id| vec![Action::DeleteConversation(id)])
                .unwrap_or_default();
        }
        TuiEvent::OpenApiKeyDialog => {
            tui.api_key_dialog.sync(&state.api_key);
            return vec![Action::ToggleApiKeyDialog(true)];
        }
        TuiEvent::OpenParametersDialog => return vec![Action::ToggleParametersDialog(true)],
        TuiEvent::FocusNext => {
            tui.set_focus(tui.focus.next(count));
            return Vec::new();
        }
        TuiEvent::FocusPrev => {
            tui.set_focus(tui.focus.prev(count));
            return Vec::new();
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.conversation_list.handle_event(event);
            return Vec::new();
        }
        TuiEvent::Escape => {
            return focused_id
                .filter(|id| state.errors.contains_key(id))
                .map(|id| vec![Action::DismissError(id)])
                .unwrap_or_default();
        }
        TuiEvent::Resize => return Vec::new(),
        _ => {}
    }

    match (tui.focus, focused_id) {
        (Focus::Prompt, _) => match tui.prompt_editor.handle_event(event) {
            Some(TextEditorEvent::Changed) => {
                vec![Action::EditPrompt(tui.prompt_editor.text().to_string())]
            }
            _ => Vec::new(),
        },
        (Focus::Conversation(_), Some(id)) => match tui.reply_editor.handle_event(event) {
            Some(TextEditorEvent::Changed) => vec![Action::UpdateConversationInput {
                conversation_id: id,
                input: tui.reply_editor.text().to_string(),
            }],
            Some(TextEditorEvent::Submit) => vec![Action::SendMessage(id)],
            None => Vec::new(),
        },
        (Focus::Conversation(_), None) => Vec::new(),
    }
}
