//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! translates keyboard events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//!  crossterm ──► TuiEvent ──► router ──► Action ──► update() ──► Effect
//!                                                     ▲            │
//!                 mpsc::Receiver<Action> ─────────────┘            ▼
//!                        ▲                               SpawnCompletion
//!                        └──── tokio task (provider.complete) ◄────┘
//! ```
//!
//! In-flight requests are tracked per conversation id. Deleting a conversation
//! aborts its task; a result that still slips through is dropped by the reducer
//! because its request id no longer matches.
//!
//! ## Redraw Strategy
//!
//! While any send is pending the loop redraws every ~80ms to animate the
//! spinner. Otherwise it sleeps up to 500ms and only redraws on events.

mod component;
pub mod components;
mod event;
pub mod router;
mod ui;

use std::collections::HashMap;
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use tokio::task::AbortHandle;

use crate::core::action::{Action, CompletionJob, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::EditorState;
use crate::inference::{CompletionProvider, CompletionRequest, LmStudioProvider, OpenAiProvider};
use crate::tui::components::{
    ApiKeyDialogState, ConversationListState, ParametersDialogState, TextEditor,
};
use crate::tui::event::{poll_event_immediate, poll_event_timeout};
use crate::tui::router::{Focus, route_event};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    pub prompt_editor: TextEditor,
    /// Reply box for the focused conversation. Re-filled when focus moves.
    pub reply_editor: TextEditor,
    pub conversation_list: ConversationListState,
    pub api_key_dialog: ApiKeyDialogState,
    pub parameters_dialog: ParametersDialogState,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            // User expects to type the prompt immediately
            focus: Focus::Prompt,
            prompt_editor: TextEditor::new(" Prompt ")
                .with_placeholder("Describe the assistant and how the conversation should go"),
            reply_editor: TextEditor::new(" Message (Enter to send, Ctrl+J newline) ")
                .submit_on_enter()
                .with_max_visible_lines(5),
            conversation_list: ConversationListState::new(),
            api_key_dialog: ApiKeyDialogState::new(),
            parameters_dialog: ParametersDialogState::new(),
        }
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if self.focus != focus {
            debug!("Focus -> {:?}", focus);
            self.focus = focus;
            self.conversation_list.reveal_selected = true;
        }
    }

    /// Index of the focused conversation, if any.
    pub fn selected(&self) -> Option<usize> {
        match self.focus {
            Focus::Conversation(i) => Some(i),
            Focus::Prompt => None,
        }
    }

    /// Pull core state into the widgets after actions were applied.
    ///
    /// Editors keep their cursor when the text is unchanged, so calling this
    /// after every event is cheap and keeps undo/redo visible immediately.
    pub fn sync(&mut self, state: &EditorState) {
        self.focus = self.focus.clamp(state.conversations().len());
        self.prompt_editor.set_text(state.prompt());

        if let Some(conversation) = self.selected().and_then(|i| state.conversations().get(i)) {
            self.reply_editor.set_text(&conversation.input);
            self.reply_editor.placeholder = Some(if conversation.has_started() {
                "Your response".to_string()
            } else {
                "Start a conversation".to_string()
            });
        }
        self.api_key_dialog.sync(&state.api_key);

        let dialog_open = state.api_key_dialog_visible || state.parameters_dialog_visible;
        self.prompt_editor.focused = !dialog_open && self.focus == Focus::Prompt;
        self.reply_editor.focused = !dialog_open && self.selected().is_some();
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

/// Build a provider from a resolved config's provider name.
pub fn build_provider(config: &ResolvedConfig) -> Arc<dyn CompletionProvider> {
    match config.provider.as_str() {
        "lmstudio" => Arc::new(LmStudioProvider::new(Some(config.lmstudio_base_url.clone()))),
        _ => Arc::new(OpenAiProvider::new(Some(config.openai_base_url.clone()))),
    }
}

/// Abort handles for in-flight completions, keyed by conversation id.
type InFlight = HashMap<String, AbortHandle>;

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let provider = build_provider(&config);
    let mut state = EditorState::from_config(provider, &config);
    if state.needs_api_key() {
        state.api_key_dialog_visible = true;
    }
    let mut tui = TuiState::new();
    tui.sync(&state);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Completion results come back through here
    let (tx, rx) = mpsc::channel();
    let mut in_flight = InFlight::new();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'event_loop: loop {
        let animating = !state.pending.is_empty();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &state, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain everything queued before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            for action in route_event(&state, &mut tui, &event) {
                if dispatch(&mut state, action, &mut in_flight, &tx) {
                    break 'event_loop;
                }
            }
            tui.sync(&state);
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if let Action::CompletionSucceeded { conversation_id, .. }
            | Action::CompletionFailed { conversation_id, .. } = &action
            {
                in_flight.remove(conversation_id);
            }
            if dispatch(&mut state, action, &mut in_flight, &tx) {
                break 'event_loop;
            }
            tui.sync(&state);
        }
    }

    for (id, handle) in in_flight.drain() {
        debug!("Aborting in-flight send for {} on exit", id);
        handle.abort();
    }
    ratatui::restore();
    info!("Prompts shutting down");
    Ok(())
}

/// Apply one action and carry out its effect. Returns true when the app should quit.
fn dispatch(
    state: &mut EditorState,
    action: Action,
    in_flight: &mut InFlight,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match update(state, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnCompletion(job) => {
            let id = job.conversation_id.clone();
            let handle = spawn_completion(state.provider.clone(), job, tx.clone());
            if let Some(previous) = in_flight.insert(id, handle) {
                previous.abort();
            }
            false
        }
        Effect::CancelCompletion(id) => {
            if let Some(handle) = in_flight.remove(&id) {
                info!("Aborting in-flight send for {}", id);
                handle.abort();
            }
            false
        }
    }
}

fn spawn_completion(
    provider: Arc<dyn CompletionProvider>,
    job: CompletionJob,
    tx: mpsc::Sender<Action>,
) -> AbortHandle {
    info!("Spawning completion request: {:?}", job);
    let handle = tokio::spawn(async move {
        let request_start = Instant::now();
        let request = CompletionRequest {
            prompt: &job.prompt,
            parameters: &job.parameters,
            stop: &job.stop,
            api_key: &job.api_key,
        };

        let action = match provider.complete(request).await {
            Ok(completion) => {
                debug!(
                    "Completion for {} in {}ms (finish_reason={:?}, usage={:?})",
                    job.conversation_id,
                    request_start.elapsed().as_millis(),
                    completion.finish_reason,
                    completion.usage
                );
                Action::CompletionSucceeded {
                    conversation_id: job.conversation_id.clone(),
                    request_id: job.request_id,
                    text: completion.text,
                }
            }
            Err(e) => {
                info!("Completion error for {}: {}", job.conversation_id, e);
                Action::CompletionFailed {
                    conversation_id: job.conversation_id.clone(),
                    request_id: job.request_id,
                    message: e.to_string(),
                }
            }
        };

        if tx.send(action).is_err() {
            warn!(
                "Failed to deliver completion for {}: receiver dropped",
                job.conversation_id
            );
        }
    });
    handle.abort_handle()
}
