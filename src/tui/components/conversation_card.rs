use chrono::{DateTime, Local, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::conversation::{Conversation, PartSource};

/// Most transcript lines a card shows. Older lines scroll off the top.
pub const BODY_MAX_LINES: u16 = 12;
/// Borders (2) + horizontal padding (2)
const HORIZONTAL_OVERHEAD: u16 = 4;
const VERTICAL_OVERHEAD: u16 = 2;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A single conversation: header, transcript tail, and send status.
///
/// Transient, like the other list items. Built each frame by
/// [`ConversationList`](super::ConversationList) and rendered into its scroll view.
///
/// Prompt text and the user's turns are plain. Generated text is bold so the
/// model's contribution stands out. An unsubmitted turn (send in flight) is dim.
pub struct ConversationCard<'a> {
    pub conversation: &'a Conversation,
    /// 1-based position in the list
    pub number: usize,
    pub selected: bool,
    pub pending: bool,
    pub error: Option<&'a str>,
    pub spinner_frame: usize,
}

impl<'a> ConversationCard<'a> {
    fn header_lines(&self) -> Vec<Line<'static>> {
        if !self.conversation.has_started() {
            return vec![Line::from(Span::styled(
                "New Conversation",
                Style::default().add_modifier(Modifier::BOLD),
            ))];
        }

        let caption = Style::default().fg(Color::DarkGray);
        let params = &self.conversation.parameters;
        vec![
            Line::from(vec![
                Span::styled(
                    format!("Conversation #{}", self.number),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" · created {}", format_created(self.conversation.created_at)),
                    caption,
                ),
            ]),
            Line::from(Span::styled("The prompt and parameters are locked.", caption)),
            Line::from(Span::styled(
                format!(
                    "{} · temp {:.2} · max {} tokens",
                    params.model, params.temperature, params.max_tokens
                ),
                caption,
            )),
        ]
    }

    fn status_line(&self) -> Option<Line<'static>> {
        if self.pending {
            let frame = SPINNER[self.spinner_frame % SPINNER.len()];
            return Some(Line::from(Span::styled(
                format!("{frame} Waiting for completion…"),
                Style::default().fg(Color::Yellow),
            )));
        }
        self.error.map(|message| {
            Line::from(vec![
                Span::styled(
                    format!("Error: {message}"),
                    Style::default().fg(Color::Red),
                ),
                Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
            ])
        })
    }

    /// Transcript as styled lines. Unstarted conversations preview the prompt
    /// and the cue for the first turn.
    fn body_lines(&self) -> Vec<Line<'static>> {
        let conversation = self.conversation;
        let mut builder = LineBuilder::default();
        builder.push(&conversation.initial_prompt, Style::default());

        if conversation.parts.is_empty() {
            builder.push(
                &conversation.sequences.restart,
                Style::default().fg(Color::DarkGray),
            );
        }
        for part in &conversation.parts {
            let style = match (part.source, part.submitted) {
                (PartSource::Generated, _) => Style::default().add_modifier(Modifier::BOLD),
                (PartSource::User, true) => Style::default(),
                (PartSource::User, false) => Style::default().add_modifier(Modifier::DIM),
            };
            builder.push(&part.text, style);
        }
        builder.finish()
    }

    fn body(&self) -> Paragraph<'static> {
        Paragraph::new(self.body_lines()).wrap(Wrap { trim: false })
    }

    fn body_height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if inner == 0 {
            return 1;
        }
        (self.body().line_count(inner) as u16).clamp(1, BODY_MAX_LINES)
    }

    /// Rendered height for `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let status = u16::from(self.status_line().is_some());
        VERTICAL_OVERHEAD + self.header_lines().len() as u16 + self.body_height(width) + status
    }
}

/// Creation time in local time, "Jan 15 14:05" style.
fn format_created(created_at: DateTime<Utc>) -> String {
    created_at.with_timezone(&Local).format("%b %d %H:%M").to_string()
}

impl Widget for ConversationCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        block.render(area, buf);

        let header = self.header_lines();
        let header_height = (header.len() as u16).min(inner.height);
        Paragraph::new(header).render(
            Rect { height: header_height, ..inner },
            buf,
        );

        let status = self.status_line();
        let status_height = u16::from(status.is_some());
        let body_height = self.body_height(area.width);
        let body_area = Rect {
            y: inner.y + header_height,
            height: body_height.min(inner.height.saturating_sub(header_height)),
            ..inner
        };

        // Keep the newest lines in view
        let body = self.body();
        let total = body.line_count(inner.width) as u16;
        let scroll = total.saturating_sub(body_area.height);
        body.scroll((scroll, 0)).render(body_area, buf);

        if let Some(line) = status {
            let y = body_area.y + body_area.height;
            if y < inner.y + inner.height {
                Paragraph::new(line)
                    .wrap(Wrap { trim: true })
                    .render(Rect { y, height: status_height, ..inner }, buf);
            }
        }
    }
}

/// Accumulates styled text that may contain newlines into ratatui lines.
#[derive(Default)]
struct LineBuilder {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
}

impl LineBuilder {
    fn push(&mut self, text: &str, style: Style) {
        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next()
            && !first.is_empty()
        {
            self.current.push(Span::styled(first.to_string(), style));
        }
        for piece in pieces {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
            if !piece.is_empty() {
                self.current.push(Span::styled(piece.to_string(), style));
            }
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.lines.push(Line::from(self.current));
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::{ChatSequences, Part};
    use crate::inference::CompletionParameters;

    fn conversation() -> Conversation {
        Conversation::new(
            "You are a helpful assistant.",
            &CompletionParameters::default(),
            ChatSequences::default(),
        )
    }

    fn card(conversation: &Conversation) -> ConversationCard<'_> {
        ConversationCard {
            conversation,
            number: 2,
            selected: false,
            pending: false,
            error: None,
            spinner_frame: 0,
        }
    }

    fn render_text(card: ConversationCard<'_>, width: u16) -> String {
        let height = card.height(width);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        card.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_unstarted_card_previews_prompt() {
        let c = conversation();
        let text = render_text(card(&c), 60);
        assert!(text.contains("New Conversation"));
        assert!(text.contains("You are a helpful assistant."));
        assert!(text.contains("Person:"));
        assert!(!text.contains("locked"));
    }

    #[test]
    fn test_started_card_is_numbered_and_locked() {
        let mut c = conversation();
        c.parts.push(Part::user("\nPerson: Hi".to_string(), true));
        c.parts.push(Part::generated("\nAI: Hello there".to_string()));
        let text = render_text(card(&c), 60);
        assert!(text.contains("Conversation #2"));
        assert!(text.contains("The prompt and parameters are locked."));
        assert!(text.contains(&format!("created {}", format_created(c.created_at))));
        assert!(text.contains("AI: Hello there"));
    }

    #[test]
    fn test_created_time_is_local() {
        let created = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let expected = created.with_timezone(&Local).format("%b %d %H:%M").to_string();
        assert_eq!(format_created(created), expected);
        assert_eq!(format_created(created).len(), "Nov 14 22:13".len());
    }

    #[test]
    fn test_error_line_rendered() {
        let c = conversation();
        let mut card = card(&c);
        card.error = Some("Invalid API key");
        let text = render_text(card, 80);
        assert!(text.contains("Error: Invalid API key"));
    }

    #[test]
    fn test_pending_adds_status_row() {
        let c = conversation();
        let idle = card(&c).height(60);
        let mut pending = card(&c);
        pending.pending = true;
        assert_eq!(pending.height(60), idle + 1);
    }

    #[test]
    fn test_body_is_capped() {
        let mut c = conversation();
        for i in 0..40 {
            c.parts.push(Part::user(format!("\nPerson: line {i}"), true));
        }
        let header = card(&c).header_lines().len() as u16;
        assert_eq!(card(&c).height(60), VERTICAL_OVERHEAD + header + BODY_MAX_LINES);

        // The tail stays visible
        let text = render_text(card(&c), 60);
        assert!(text.contains("line 39"));
        assert!(!text.contains("line 0 "));
    }

    #[test]
    fn test_line_builder_splits_newlines() {
        let mut builder = LineBuilder::default();
        builder.push("a\nb", Style::default());
        builder.push("c\n", Style::default());
        let lines = builder.finish();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].to_string(), "bc");
        assert_eq!(lines[2].to_string(), "");
    }
}
