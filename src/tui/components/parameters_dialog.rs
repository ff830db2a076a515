//! # Parameters Dialog
//!
//! Overlay for the sampling parameters. Up/Down picks a row, Left/Right
//! nudges its value. Each nudge becomes an `EditParameters` action, so
//! unstarted conversations pick the change up immediately and a whole
//! dialog session undoes as one step.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::inference::{CompletionParameters, Parameter};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::centered_rect;
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParametersDialogEvent {
    /// Move `Parameter` by this many steps
    Adjust(Parameter, i32),
    Dismiss,
}

pub struct ParametersDialogState {
    pub list_state: ListState,
}

impl Default for ParametersDialogState {
    fn default() -> Self {
        Self::new()
    }
}

impl ParametersDialogState {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default().with_selected(Some(0)),
        }
    }

    pub fn selected(&self) -> Parameter {
        let index = self.list_state.selected().unwrap_or(0);
        Parameter::ALL[index.min(Parameter::ALL.len() - 1)]
    }
}

impl EventHandler for ParametersDialogState {
    type Event = ParametersDialogEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let index = self.list_state.selected().unwrap_or(0);
        match event {
            TuiEvent::Escape | TuiEvent::Submit => Some(ParametersDialogEvent::Dismiss),
            TuiEvent::CursorUp => {
                self.list_state.select(Some(index.saturating_sub(1)));
                None
            }
            TuiEvent::CursorDown => {
                self.list_state
                    .select(Some((index + 1).min(Parameter::ALL.len() - 1)));
                None
            }
            TuiEvent::CursorLeft => Some(ParametersDialogEvent::Adjust(self.selected(), -1)),
            TuiEvent::CursorRight => Some(ParametersDialogEvent::Adjust(self.selected(), 1)),
            _ => None,
        }
    }
}

pub struct ParametersDialog<'a> {
    pub state: &'a mut ParametersDialogState,
    pub parameters: &'a CompletionParameters,
}

impl Component for ParametersDialog<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(50, 50, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Parameters ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" ↑↓ Select  ←→ Adjust  Esc Close ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [model_area, list_area, stop_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(Parameter::ALL.len() as u16),
            Constraint::Length(2),
        ])
        .areas(inner);

        let caption = Style::default().fg(Color::DarkGray);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Model  ", caption),
                Span::raw(self.parameters.model.clone()),
            ])),
            model_area,
        );

        let label_width = Parameter::ALL
            .iter()
            .map(|p| p.label().len())
            .max()
            .unwrap_or(0);
        let items: Vec<ListItem> = Parameter::ALL
            .iter()
            .map(|&param| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<label_width$}  ", param.label())),
                    Span::styled(
                        format!("◂ {} ▸", self.parameters.display_value(param)),
                        Style::default().fg(Color::Cyan),
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("› ");
        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);

        let stop = if self.parameters.stop.is_empty() {
            "none".to_string()
        } else {
            self.parameters
                .stop
                .iter()
                .map(|s| format!("{s:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Extra stop sequences  ", caption),
                Span::raw(stop),
            ])),
            stop_area,
        );
    }
}
