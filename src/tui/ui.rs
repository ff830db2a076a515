use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::state::EditorState;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{ApiKeyDialog, ConversationList, ParametersDialog, TitleBar};
use crate::tui::router::Focus;

/// Share of the width given to the prompt editor
const PROMPT_WIDTH_PERCENT: u16 = 45;

pub fn draw_ui(frame: &mut Frame, state: &EditorState, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min, Percentage};
    let [title_area, main_area, footer_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());
    let [prompt_area, right_area] = Layout::horizontal([
        Percentage(PROMPT_WIDTH_PERCENT),
        Percentage(100 - PROMPT_WIDTH_PERCENT),
    ])
    .areas(main_area);

    let mut title_bar = TitleBar {
        model_name: state.parameters().model.clone(),
        provider_name: state.provider.name().to_string(),
        status_message: state.status_message.clone(),
        can_undo: state.history.can_undo(),
        can_redo: state.history.can_redo(),
        pending_sends: state.pending.len(),
    };
    title_bar.render(frame, title_area);

    tui.prompt_editor
        .set_max_visible_lines(prompt_area.height.saturating_sub(2));
    tui.prompt_editor.render(frame, prompt_area);

    draw_conversations(frame, right_area, state, tui, spinner_frame);

    frame.render_widget(key_hints(tui.focus), footer_area);

    if state.api_key_dialog_visible {
        ApiKeyDialog {
            state: &mut tui.api_key_dialog,
            provider_name: provider_label(state.provider.name()),
        }
        .render(frame, frame.area());
    } else if state.parameters_dialog_visible {
        ParametersDialog {
            state: &mut tui.parameters_dialog,
            parameters: state.parameters(),
        }
        .render(frame, frame.area());
    }
}

/// Card column, with the reply box under it while a conversation is focused.
fn draw_conversations(
    frame: &mut Frame,
    area: Rect,
    state: &EditorState,
    tui: &mut TuiState,
    spinner_frame: usize,
) {
    let selected = tui.selected();
    let reply_height = if selected.is_some() {
        tui.reply_editor.calculate_height(area.width)
    } else {
        0
    };
    let [list_area, reply_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(reply_height)]).areas(area);

    if state.conversations().is_empty() {
        let hint = Line::from(Span::styled(
            "No conversations. Press Ctrl+N to start one.",
            Style::default().fg(Color::DarkGray),
        ))
        .centered();
        frame.render_widget(hint, list_area);
    } else {
        ConversationList {
            state: &mut tui.conversation_list,
            editor: state,
            selected,
            spinner_frame,
        }
        .render(frame, list_area);
    }

    if selected.is_some() {
        tui.reply_editor.render(frame, reply_area);
    }
}

fn key_hints(focus: Focus) -> Line<'static> {
    let hints: &[(&str, &str)] = match focus {
        Focus::Prompt => &[
            ("Tab", "conversations"),
            ("Ctrl+N", "new"),
            ("Ctrl+P", "parameters"),
            ("Ctrl+K", "API key"),
            ("Ctrl+Z/Y", "undo/redo"),
            ("Ctrl+C", "quit"),
        ],
        Focus::Conversation(_) => &[
            ("Enter", "send"),
            ("Ctrl+J", "newline"),
            ("Tab", "next"),
            ("Ctrl+D", "delete"),
            ("Esc", "dismiss error"),
            ("PgUp/PgDn", "scroll"),
            ("Ctrl+C", "quit"),
        ],
    };

    let key_style = Style::default().fg(Color::Cyan);
    let text_style = Style::default().fg(Color::DarkGray);
    let spans = hints.iter().enumerate().flat_map(|(i, (key, label))| {
        let gap = if i == 0 { "" } else { "  " };
        [
            Span::raw(gap),
            Span::styled(*key, key_style),
            Span::styled(format!(" {label}"), text_style),
        ]
    });
    Line::from(spans.collect::<Vec<_>>())
}

fn provider_label(name: &str) -> &str {
    match name {
        "openai" => "OpenAI",
        "lmstudio" => "LM Studio",
        other => other,
    }
}
