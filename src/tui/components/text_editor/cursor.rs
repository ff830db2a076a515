//! Cursor and viewport tracking for [`TextEditor`](super::TextEditor).
//!
//! The buffer lives in the editor. Every method here takes the text it works
//! on explicitly, because a masked editor lays out a different string than it
//! stores.

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

use super::wrap::{CONTENT_OFFSET, inner_width, wrap_line_count, wrap_options};

pub(super) struct CursorState {
    /// Byte offset into the buffer (0..=buffer.len())
    pub pos: usize,
    /// First wrapped line shown when the text is taller than the viewport
    pub scroll_offset: u16,
    /// Area width from the last render, needed for Up/Down between renders
    pub last_area_width: u16,
}

/// (start byte, len) of each wrapped line of `buffer`.
///
/// textwrap drops the spaces at a soft break and the newline at a hard one.
/// Both are skipped here so each span starts where its text does.
fn line_spans(buffer: &str, width: u16) -> Vec<(usize, usize)> {
    let bytes = buffer.as_bytes();
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in textwrap::wrap(buffer, wrap_options(width)) {
        spans.push((offset, line.len()));
        offset += line.len();
        while bytes.get(offset) == Some(&b' ') {
            offset += 1;
        }
        if bytes.get(offset) == Some(&b'\n') {
            offset += 1;
        }
    }
    spans
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_area_width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn move_to_end(&mut self, buffer: &str) {
        self.pos = buffer.len();
    }

    /// Move one wrapped line up (`-1`) or down (`1`), keeping the column where possible.
    ///
    /// Returns `false` when already on the first or last line.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16) -> bool {
        let width = inner_width(self.last_area_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }

        let spans = line_spans(buffer, width);
        if spans.is_empty() {
            return false;
        }

        let current = spans
            .iter()
            .position(|&(start, len)| self.pos <= start + len)
            .unwrap_or(spans.len() - 1);
        let target = match direction {
            d if d < 0 && current > 0 => current - 1,
            d if d > 0 && current + 1 < spans.len() => current + 1,
            _ => return false,
        };

        let column = self.pos.saturating_sub(spans[current].0);
        let (start, len) = spans[target];
        let mut pos = (start + column.min(len)).min(buffer.len());
        while !buffer.is_char_boundary(pos) {
            pos -= 1;
        }
        self.pos = pos;
        true
    }

    /// Wrapped line (0-based) that byte offset `pos` of `text` falls on.
    pub fn line_of(text: &str, pos: usize, area_width: u16) -> u16 {
        let width = inner_width(area_width);
        if width == 0 {
            return 0;
        }
        wrap_line_count(&text[..pos], width).saturating_sub(1)
    }

    /// Scroll just enough to keep the cursor line inside `max_lines`.
    pub fn update_scroll_offset(&mut self, text: &str, pos: usize, area_width: u16, max_lines: u16) {
        let total = wrap_line_count(text, inner_width(area_width));
        if total <= max_lines {
            self.scroll_offset = 0;
            return;
        }

        let line = Self::line_of(text, pos, area_width);
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset.saturating_add(max_lines) {
            self.scroll_offset = line + 1 - max_lines;
        }
    }

    /// Screen (column, row) of byte offset `pos` in `text` rendered into `area`.
    pub fn screen_pos(&self, text: &str, pos: usize, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + CONTENT_OFFSET, area.y + 1);
        }

        let before = &text[..pos];
        let line = wrap_line_count(before, width).saturating_sub(1);

        // textwrap trims trailing spaces, so measure the logical line directly
        let logical = before.rsplit('\n').next().unwrap_or("");
        let segments = textwrap::wrap(logical, wrap_options(width));
        let consumed: usize = segments
            .iter()
            .take(segments.len().saturating_sub(1))
            .map(|segment| segment.len())
            .sum();
        let tail = logical.get(consumed..).unwrap_or("").trim_start_matches(' ');
        let column = (tail.width() as u16).min(width);

        let row = line.saturating_sub(self.scroll_offset);
        (area.x + CONTENT_OFFSET + column, area.y + 1 + row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_movement_across_newlines() {
        let text = "first\nsecond";
        let mut cursor = CursorState::new();
        cursor.pos = text.len();

        assert!(cursor.move_vertically(text, -1));
        assert_eq!(cursor.pos, 5);
        assert!(!cursor.move_vertically(text, -1));
        assert!(cursor.move_vertically(text, 1));
        assert_eq!(cursor.pos, 11);
    }

    #[test]
    fn test_spans_skip_soft_break_spaces() {
        assert_eq!(
            line_spans("aaaa bbbb cccc", 4),
            vec![(0, 4), (5, 4), (10, 4)]
        );
        assert_eq!(line_spans("ab  \ncd", 10)[1], (5, 2));
    }

    #[test]
    fn test_vertical_movement_keeps_column_across_soft_wraps() {
        let text = "aaaa bbbb cccc";
        let mut cursor = CursorState::new();
        // 4 columns of text once borders and padding are taken off
        cursor.last_area_width = 8;
        cursor.pos = 6;

        assert!(cursor.move_vertically(text, -1));
        assert_eq!(cursor.pos, 1);
        assert!(cursor.move_vertically(text, 1));
        assert_eq!(cursor.pos, 6);
        assert!(cursor.move_vertically(text, 1));
        assert_eq!(cursor.pos, 11);
    }

    #[test]
    fn test_line_of_counts_newlines() {
        let text = "a\nb\nc";
        assert_eq!(CursorState::line_of(text, 0, 40), 0);
        assert_eq!(CursorState::line_of(text, text.len(), 40), 2);
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let text = "1\n2\n3\n4\n5\n6";
        let mut cursor = CursorState::new();
        cursor.update_scroll_offset(text, text.len(), 40, 3);
        assert_eq!(cursor.scroll_offset, 3);
        cursor.update_scroll_offset(text, 0, 40, 3);
        assert_eq!(cursor.scroll_offset, 0);
    }

    #[test]
    fn test_screen_pos_uses_display_width() {
        let cursor = CursorState::new();
        let area = Rect::new(0, 0, 40, 5);
        let text = "日本";
        assert_eq!(cursor.screen_pos(text, text.len(), area), (CONTENT_OFFSET + 4, 1));
        assert_eq!(cursor.screen_pos("a\n", 2, area), (CONTENT_OFFSET, 2));
    }
}
