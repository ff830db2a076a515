//! Wrapping math and byte-offset helpers for [`TextEditor`](super::TextEditor).
//!
//! Stateless. Everything here works on `&str` plus a width.

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to content (border + left padding)
pub(super) const CONTENT_OFFSET: u16 = 2;

/// Options matching how the editor lays text out.
pub(super) fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Usable text width inside the block. 0 if the area is too narrow.
pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Number of wrapped lines `text` occupies. Never less than 1.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);
    // A trailing newline opens a line textwrap doesn't always report
    if text.ends_with('\n') && lines.last().is_none_or(|l| !l.is_empty()) {
        count += 1;
    }
    count
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos].char_indices().last().map_or(0, |(i, _)| i)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map_or(text.len(), |c| pos + c.len_utf8())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos`, skipping separators first (readline `backward-word`).
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let head = &text[..pos];
    let trimmed = head.trim_end_matches(|c: char| !is_word_char(c));
    trimmed
        .char_indices()
        .rev()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(0, |(i, c)| i + c.len_utf8())
}

/// End of the word after `pos`, skipping separators first (readline `forward-word`).
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let tail = &text[pos..];
    let skipped = tail.len() - tail.trim_start_matches(|c: char| !is_word_char(c)).len();
    let rest = &tail[skipped..];
    let word_len = rest
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(rest.len(), |(i, _)| i);
    pos + skipped + word_len
}
