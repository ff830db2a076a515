//! # TextEditor Component
//!
//! A bordered, wrapping, multi-line text field. The prompt editor, the reply
//! box under the selected conversation, and the API key dialog all use it.
//!
//! ## Responsibilities
//!
//! - Capture text input, paste, and deletion
//! - Cursor movement by character, word, line, and wrapped row
//! - Grow with its content up to `max_visible_lines`, then scroll internally
//! - Optionally mask its contents (API key)
//!
//! ## State Management
//!
//! The buffer is owned here while the user types. The router mirrors it into
//! the core state on every `TextEditorEvent::Changed`, and pushes core state
//! back in with [`TextEditor::set_text`] after undo/redo.

mod cursor;
mod wrap;

use std::borrow::Cow;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use wrap::{
    VERTICAL_OVERHEAD, inner_width, next_char_boundary, next_word_boundary, prev_char_boundary,
    prev_word_boundary, wrap_line_count, wrap_options,
};

const MASK_CHAR: char = '•';

/// High-level events emitted by the TextEditor
#[derive(Debug, Clone, PartialEq)]
pub enum TextEditorEvent {
    /// The buffer changed. Read it back with [`TextEditor::text`].
    Changed,
    /// Enter pressed in an editor built with `submit_on_enter`
    Submit,
}

pub struct TextEditor {
    buffer: String,
    cursor: CursorState,
    /// Border title (Prop)
    pub title: String,
    /// Dim hint shown while the buffer is empty (Prop)
    pub placeholder: Option<String>,
    /// Whether this editor owns the terminal cursor (Prop)
    pub focused: bool,
    /// Border color while focused (Prop)
    pub accent: Color,
    masked: bool,
    submit_on_enter: bool,
    max_visible_lines: u16,
}

impl TextEditor {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
            title: title.into(),
            placeholder: None,
            focused: false,
            accent: Color::Green,
            masked: false,
            submit_on_enter: false,
            max_visible_lines: 5,
        }
    }

    /// Enter emits `Submit` instead of inserting a newline.
    pub fn submit_on_enter(mut self) -> Self {
        self.submit_on_enter = true;
        self
    }

    /// Render every character as a bullet. Newlines are rejected.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_max_visible_lines(mut self, lines: u16) -> Self {
        self.set_max_visible_lines(lines);
        self
    }

    /// For editors that fill whatever area the layout gives them.
    pub fn set_max_visible_lines(&mut self, lines: u16) {
        self.max_visible_lines = lines.max(1);
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer from outside (undo, switching conversations).
    ///
    /// A no-op when the text is unchanged, so the cursor survives the
    /// per-frame sync with core state.
    pub fn set_text(&mut self, text: &str) {
        if self.buffer == text {
            return;
        }
        self.buffer = text.to_string();
        self.cursor.move_to_end(&self.buffer);
        self.cursor.scroll_offset = 0;
    }

    /// Height needed for the current content, including borders.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let lines = wrap_line_count(&self.display_text(), inner_width(area_width));
        lines.min(self.max_visible_lines) + VERTICAL_OVERHEAD
    }

    fn display_text(&self) -> Cow<'_, str> {
        if self.masked {
            Cow::Owned(self.buffer.chars().map(|_| MASK_CHAR).collect())
        } else {
            Cow::Borrowed(&self.buffer)
        }
    }

    /// Cursor position translated into `display_text` byte offsets.
    fn display_pos(&self) -> usize {
        if self.masked {
            self.buffer[..self.cursor.pos].chars().count() * MASK_CHAR.len_utf8()
        } else {
            self.cursor.pos
        }
    }

    fn visible_lines(&self, text: &str, area_width: u16) -> Vec<Line<'static>> {
        let width = inner_width(area_width);
        if width == 0 {
            return Vec::new();
        }
        let start = self.cursor.scroll_offset as usize;
        textwrap::wrap(text, wrap_options(width))
            .into_iter()
            .skip(start)
            .take(self.max_visible_lines as usize)
            .map(|line| Line::raw(line.into_owned()))
            .collect()
    }

    fn render_scrollbar(&self, frame: &mut Frame, area: Rect, total_lines: u16) {
        if total_lines <= self.max_visible_lines {
            return;
        }
        // content_length is the max scroll position, not the line count
        let mut state = ScrollbarState::default()
            .content_length(total_lines.saturating_sub(self.max_visible_lines) as usize)
            .position(self.cursor.scroll_offset as usize);
        let bar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            bar_area,
            &mut state,
        );
    }

    fn insert_str(&mut self, text: &str) -> Option<TextEditorEvent> {
        let text: Cow<'_, str> = if self.masked {
            Cow::Owned(text.chars().filter(|c| *c != '\n' && *c != '\r').collect())
        } else {
            Cow::Owned(text.replace("\r\n", "\n"))
        };
        if text.is_empty() {
            return None;
        }
        self.buffer.insert_str(self.cursor.pos, &text);
        self.cursor.pos += text.len();
        Some(TextEditorEvent::Changed)
    }

    /// Move the cursor without editing. Returns `None` so the owner doesn't
    /// treat navigation as an edit.
    fn move_to(&mut self, pos: usize) -> Option<TextEditorEvent> {
        self.cursor.pos = pos;
        None
    }
}

impl Component for TextEditor {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_area_width = area.width;
        let display = self.display_text().into_owned();
        let display_pos = self.display_pos();
        self.cursor
            .update_scroll_offset(&display, display_pos, area.width, self.max_visible_lines);

        let border_style = if self.focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(ratatui::widgets::Padding::horizontal(1))
            .title(self.title.as_str());

        let paragraph = match (&self.placeholder, self.buffer.is_empty()) {
            (Some(placeholder), true) => Paragraph::new(Line::from(Span::styled(
                placeholder.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))),
            _ => Paragraph::new(self.visible_lines(&display, area.width)),
        };
        frame.render_widget(paragraph.block(block), area);

        let total_lines = wrap_line_count(&display, inner_width(area.width));
        self.render_scrollbar(frame, area, total_lines);

        if self.focused {
            frame.set_cursor_position(self.cursor.screen_pos(&display, display_pos, area));
        }
    }
}

impl EventHandler for TextEditor {
    type Event = TextEditorEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let pos = self.cursor.pos;
        match event {
            TuiEvent::InputChar(c) => self.insert_str(c.encode_utf8(&mut [0; 4])),
            TuiEvent::Paste(text) => self.insert_str(text),
            TuiEvent::Newline => self.insert_str("\n"),
            TuiEvent::Submit if self.submit_on_enter => Some(TextEditorEvent::Submit),
            TuiEvent::Submit => self.insert_str("\n"),
            TuiEvent::Backspace if pos > 0 => {
                let prev = prev_char_boundary(&self.buffer, pos);
                self.buffer.drain(prev..pos);
                self.cursor.pos = prev;
                Some(TextEditorEvent::Changed)
            }
            TuiEvent::Delete if pos < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, pos);
                self.buffer.drain(pos..next);
                Some(TextEditorEvent::Changed)
            }
            TuiEvent::CursorLeft => self.move_to(prev_char_boundary(&self.buffer, pos)),
            TuiEvent::CursorRight => self.move_to(next_char_boundary(&self.buffer, pos)),
            TuiEvent::WordLeft => self.move_to(prev_word_boundary(&self.buffer, pos)),
            TuiEvent::WordRight => self.move_to(next_word_boundary(&self.buffer, pos)),
            TuiEvent::CursorHome => {
                let start = self.buffer[..pos].rfind('\n').map_or(0, |i| i + 1);
                self.move_to(start)
            }
            TuiEvent::CursorEnd => {
                let end = self.buffer[pos..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| pos + i);
                self.move_to(end)
            }
            TuiEvent::CursorUp if !self.masked => {
                self.cursor.move_vertically(&self.buffer, -1);
                None
            }
            TuiEvent::CursorDown if !self.masked => {
                self.cursor.move_vertically(&self.buffer, 1);
                None
            }
            _ => None,
        }
    }
}
