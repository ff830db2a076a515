//! # TitleBar Component
//!
//! Single-line status bar at the top of the screen.
//!
//! Purely presentational. Every field is a prop filled in from `EditorState`
//! each frame:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar {
//!     model_name: state.parameters().model.clone(),
//!     provider_name: state.provider.name().to_string(),
//!     status_message: state.status_message.clone(),
//!     can_undo: state.history.can_undo(),
//!     can_redo: state.history.can_redo(),
//!     pending_sends: state.pending.len(),
//! };
//! title_bar.render(frame, title_area);
//! ```
//!
//! The text degrades from the right on narrow terminals, so the model name
//! stays visible longest.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar {
    pub model_name: String,
    pub provider_name: String,
    pub status_message: String,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Sends currently in flight across all conversations
    pub pending_sends: usize,
}

impl TitleBar {
    fn history_span(label: &'static str, enabled: bool) -> Span<'static> {
        if enabled {
            Span::styled(label, Style::default().fg(Color::Cyan))
        } else {
            Span::styled(label, Style::default().fg(Color::DarkGray))
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let separator = Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled("Prompts", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" (model: {} via {})", self.model_name, self.provider_name)),
        ];

        if self.pending_sends > 0 {
            spans.push(separator.clone());
            spans.push(Span::styled(
                format!("{} sending", self.pending_sends),
                Style::default().fg(Color::Yellow),
            ));
        }
        if !self.status_message.is_empty() {
            spans.push(separator.clone());
            spans.push(Span::raw(self.status_message.clone()));
        }

        spans.push(separator);
        spans.push(Self::history_span("undo", self.can_undo));
        spans.push(Span::raw(" "));
        spans.push(Self::history_span("redo", self.can_redo));

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn title_bar() -> TitleBar {
        TitleBar {
            model_name: "gpt-3.5-turbo-instruct".to_string(),
            provider_name: "openai".to_string(),
            status_message: String::new(),
            can_undo: false,
            can_redo: false,
            pending_sends: 0,
        }
    }

    fn draw(title_bar: &mut TitleBar) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_shows_model_and_provider() {
        let text = draw(&mut title_bar());
        assert!(text.contains("Prompts"));
        assert!(text.contains("gpt-3.5-turbo-instruct via openai"));
        assert!(!text.contains("sending"));
    }

    #[test]
    fn test_shows_status_and_pending() {
        let mut bar = title_bar();
        bar.status_message = "Sent to Conversation #1".to_string();
        bar.pending_sends = 2;
        let text = draw(&mut bar);
        assert!(text.contains("2 sending"));
        assert!(text.contains("Sent to Conversation #1"));
    }

    #[test]
    fn test_history_availability_styling() {
        let mut bar = title_bar();
        bar.can_undo = true;
        let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();
        terminal.draw(|f| bar.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = buffer.content().iter().map(|c| c.symbol()).collect();
        let undo_x = row.find("undo").unwrap() as u16;
        let redo_x = row.find("redo").unwrap() as u16;
        assert_eq!(buffer[(undo_x, 0)].fg, Color::Cyan);
        assert_eq!(buffer[(redo_x, 0)].fg, Color::DarkGray);
    }
}
