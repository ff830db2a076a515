//! # ConversationList Component
//!
//! Scrollable column of [`ConversationCard`]s.
//!
//! `ConversationList` is transient (built each frame) and wraps
//! `&mut ConversationListState`, which persists in `TuiState`. Card heights
//! are measured before drawing so the scroll view knows its canvas size.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::state::EditorState;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::conversation_card::ConversationCard;
use crate::tui::event::TuiEvent;

/// Scroll state for the conversation column. Lives in `TuiState`.
#[derive(Default)]
pub struct ConversationListState {
    pub scroll_state: ScrollViewState,
    /// Card heights from the last render
    pub heights: Vec<u16>,
    pub viewport_height: u16,
    /// Set when the selection moves; the next render scrolls it into view
    pub reveal_selected: bool,
}

impl ConversationListState {
    pub fn new() -> Self {
        Self {
            reveal_selected: true,
            ..Self::default()
        }
    }

    fn total_height(&self) -> u16 {
        self.heights.iter().sum()
    }

    /// Keep the offset inside the content after cards shrink or disappear.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.total_height().saturating_sub(self.viewport_height);
        let offset = self.scroll_state.offset();
        if offset.y > max_y {
            self.scroll_state.set_offset(Position { x: offset.x, y: max_y });
        }
    }

    /// Scroll so card `index` is visible. Tall cards are bottom-aligned so
    /// the latest turn and the reply box sit next to each other.
    pub fn scroll_to(&mut self, index: usize) {
        let Some(&height) = self.heights.get(index) else {
            return;
        };
        let top: u16 = self.heights[..index].iter().sum();
        let bottom = top + height;
        let offset = self.scroll_state.offset().y;

        let new_y = if bottom > offset + self.viewport_height {
            bottom.saturating_sub(self.viewport_height)
        } else if top < offset {
            top
        } else {
            return;
        };
        self.scroll_state.set_offset(Position { x: 0, y: new_y });
    }
}

pub struct ConversationList<'a> {
    pub state: &'a mut ConversationListState,
    pub editor: &'a EditorState,
    pub selected: Option<usize>,
    pub spinner_frame: usize,
}

impl<'a> ConversationList<'a> {
    fn card(&self, index: usize) -> Option<ConversationCard<'a>> {
        let editor = self.editor;
        let conversation = editor.conversations().get(index)?;
        Some(ConversationCard {
            conversation,
            number: index + 1,
            selected: self.selected == Some(index),
            pending: editor.is_pending(&conversation.id),
            error: editor.errors.get(&conversation.id).map(String::as_str),
            spinner_frame: self.spinner_frame,
        })
    }
}

impl Component for ConversationList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Leave a column for the scrollbar
        let content_width = area.width.saturating_sub(1);
        let count = self.editor.conversations().len();

        let heights: Vec<u16> = (0..count)
            .filter_map(|i| self.card(i))
            .map(|card| card.height(content_width))
            .collect();
        self.state.heights = heights;
        self.state.viewport_height = area.height;
        self.state.clamp_scroll();

        if self.state.reveal_selected {
            if let Some(index) = self.selected {
                self.state.scroll_to(index);
            }
            self.state.reveal_selected = false;
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, self.state.total_height()))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = 0u16;
        for index in 0..count {
            let height = self.state.heights.get(index).copied().unwrap_or(0);
            if let Some(card) = self.card(index) {
                scroll_view.render_widget(card, Rect::new(0, y, content_width, height));
            }
            y += height;
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Implemented on the state because `ConversationList` is rebuilt every frame.
impl EventHandler for ConversationListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => self.scroll_state.scroll_up(),
            TuiEvent::ScrollDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            _ => return None,
        }
        self.clamp_scroll();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use crate::test_support::test_state;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(editor: &EditorState, state: &mut ConversationListState, selected: usize) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| {
                let mut list = ConversationList {
                    state: &mut *state,
                    editor,
                    selected: Some(selected),
                    spinner_frame: 0,
                };
                list.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_renders_every_card_height() {
        let mut editor = test_state();
        update(&mut editor, Action::AddConversation);
        let mut state = ConversationListState::new();
        let screen = draw(&editor, &mut state, 0);
        assert_eq!(state.heights.len(), 2);
        assert!(screen.contains("New Conversation"));
    }

    #[test]
    fn test_selection_scrolls_into_view() {
        let mut editor = test_state();
        for _ in 0..5 {
            update(&mut editor, Action::AddConversation);
        }
        let mut state = ConversationListState::new();
        draw(&editor, &mut state, 0);
        assert_eq!(state.scroll_state.offset().y, 0);

        state.reveal_selected = true;
        draw(&editor, &mut state, 5);
        let top: u16 = state.heights[..5].iter().sum();
        let bottom = top + state.heights[5];
        let offset = state.scroll_state.offset().y;
        assert!(offset <= top && bottom <= offset + state.viewport_height);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let editor = test_state();
        let mut state = ConversationListState::new();
        draw(&editor, &mut state, 0);
        state.handle_event(&TuiEvent::ScrollPageDown);
        assert_eq!(state.scroll_state.offset().y, 0);
    }
}
