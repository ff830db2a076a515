use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use log::{debug, warn};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    // Global shortcuts (routed to core::update)
    ForceQuit,
    Undo,
    Redo,
    AddConversation,
    DeleteConversation,
    OpenApiKeyDialog,
    OpenParametersDialog,

    // Focus
    FocusNext,
    FocusPrev,
    Escape,

    // Text editing (handled by the focused editor)
    Submit,
    Newline,
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
    WordLeft,
    WordRight,

    // Conversation list scrolling
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,

    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => match event::read() {
            Ok(raw) => translate(raw),
            Err(e) => {
                warn!("Failed to read terminal event: {}", e);
                None
            }
        },
        Ok(false) => None,
        Err(e) => {
            warn!("Failed to poll terminal events: {}", e);
            None
        }
    }
}

/// Map a raw crossterm event onto a `TuiEvent`.
pub fn translate(raw: Event) -> Option<TuiEvent> {
    match raw {
        Event::Key(key_event) => translate_key(key_event),
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn translate_key(key_event: KeyEvent) -> Option<TuiEvent> {
    // Keyboard enhancement reports releases and repeats too
    if key_event.kind != KeyEventKind::Press {
        return None;
    }
    debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code, key_event.modifiers
    );

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key_event.modifiers.contains(KeyModifiers::ALT);

    match key_event.code {
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' => Some(TuiEvent::ForceQuit),
            'z' => Some(TuiEvent::Undo),
            'y' => Some(TuiEvent::Redo),
            'n' => Some(TuiEvent::AddConversation),
            'd' => Some(TuiEvent::DeleteConversation),
            'k' => Some(TuiEvent::OpenApiKeyDialog),
            'p' => Some(TuiEvent::OpenParametersDialog),
            // ASCII LF; Ctrl+Enter sends this in most terminals
            'j' => Some(TuiEvent::Newline),
            'a' => Some(TuiEvent::CursorHome),
            'e' => Some(TuiEvent::CursorEnd),
            _ => None,
        },
        KeyCode::Char('b') if alt => Some(TuiEvent::WordLeft),
        KeyCode::Char('f') if alt => Some(TuiEvent::WordRight),
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter
            if key_event
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            Some(TuiEvent::Newline)
        }
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Tab => Some(TuiEvent::FocusNext),
        KeyCode::BackTab => Some(TuiEvent::FocusPrev),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Left if ctrl || alt => Some(TuiEvent::WordLeft),
        KeyCode::Right if ctrl || alt => Some(TuiEvent::WordRight),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}
