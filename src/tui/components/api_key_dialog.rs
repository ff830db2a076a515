//! # API Key Dialog
//!
//! Centered overlay with a masked editor for the provider's API key.
//! Opened with Ctrl+K, or on its own when a send needs a key.
//!
//! Persistent state + transient wrapper, like the other overlays:
//! - `ApiKeyDialogState` lives in `TuiState`
//! - `ApiKeyDialog` is built each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::centered_rect;
use crate::tui::components::text_editor::{TextEditor, TextEditorEvent};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiKeyDialogEvent {
    /// The key text changed. Read it with [`ApiKeyDialogState::key`].
    Changed,
    Dismiss,
}

pub struct ApiKeyDialogState {
    editor: TextEditor,
}

impl Default for ApiKeyDialogState {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiKeyDialogState {
    pub fn new() -> Self {
        let mut editor = TextEditor::new(" API Key ")
            .masked()
            .submit_on_enter()
            .with_max_visible_lines(1)
            .with_placeholder("sk-...");
        editor.focused = true;
        editor.accent = Color::Cyan;
        Self { editor }
    }

    pub fn key(&self) -> &str {
        self.editor.text()
    }

    /// Mirror the stored key into the editor (dialog opening, undo elsewhere).
    pub fn sync(&mut self, key: &str) {
        self.editor.set_text(key);
    }
}

impl EventHandler for ApiKeyDialogState {
    type Event = ApiKeyDialogEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Escape => Some(ApiKeyDialogEvent::Dismiss),
            _ => match self.editor.handle_event(event)? {
                TextEditorEvent::Submit => Some(ApiKeyDialogEvent::Dismiss),
                TextEditorEvent::Changed => Some(ApiKeyDialogEvent::Changed),
            },
        }
    }
}

pub struct ApiKeyDialog<'a> {
    pub state: &'a mut ApiKeyDialogState,
    pub provider_name: &'a str,
}

impl Component for ApiKeyDialog<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 40, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" API Key ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Enter Done  Esc Close ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [text_area, editor_area, _] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .areas(inner);

        let explanation = Paragraph::new(vec![
            Line::from(format!("Please provide your {} API key.", self.provider_name)),
            Line::styled(
                "It is kept in memory for this session only.",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(explanation, text_area);
        self.state.editor.render(frame, editor_area);
    }
}
