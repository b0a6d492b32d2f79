//! Width-aware helpers for laying text into fixed-width terminal areas.
//!
//! All indices are byte offsets into UTF-8 strings and always land on valid
//! character boundaries.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

fn clamp_to_char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Compute a window `[start, end)` of `text` that fits `available_width`
/// cells and keeps `cursor` (byte offset) visible.
pub fn window(text: &str, cursor: usize, available_width: usize) -> (usize, usize) {
    let cursor = clamp_to_char_boundary(text, cursor);
    if available_width == 0 || text.is_empty() {
        return (cursor, cursor);
    }

    let start = compute_window_start(text, cursor, available_width);
    let end = start + truncate_to_width(&text[start..], available_width);
    (start, end.min(text.len()))
}

/// Window start (byte offset) that keeps `cursor` visible.
pub fn compute_window_start(text: &str, cursor: usize, available_width: usize) -> usize {
    let cursor = clamp_to_char_boundary(text, cursor);
    if available_width == 0 {
        return cursor;
    }

    let visible_end = text[cursor..]
        .chars()
        .next()
        .map_or(cursor, |ch| cursor + ch.len_utf8());
    let prefix = &text[..visible_end];
    if UnicodeWidthStr::width(prefix) <= available_width {
        return 0;
    }

    let mut start = cursor;
    let mut used = 0usize;
    for (idx, ch) in prefix.char_indices().rev() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > available_width {
            break;
        }
        used += w;
        start = idx;
    }
    start
}

/// Returns how many bytes from the start of `s` fit into `max_width` cells.
pub fn truncate_to_width(s: &str, max_width: usize) -> usize {
    if max_width == 0 || s.is_empty() {
        return 0;
    }

    let mut used = 0usize;
    let mut end = 0usize;
    for (idx, ch) in s.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max_width {
            break;
        }
        used += w;
        end = idx + ch.len_utf8();
    }
    end
}

/// Display width of `s` in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Splits `text` into byte ranges that each fit `max_width` cells.
///
/// Breaks prefer the last space inside the window; the space itself is
/// dropped, and runs of spaces at the start of a continuation are skipped.
/// A single character wider than the window still gets its own range.
pub fn wrap_ranges(text: &str, max_width: usize) -> Vec<(usize, usize)> {
    if text.is_empty() || max_width == 0 {
        return vec![(0, text.len())];
    }

    let mut ranges = Vec::new();
    let mut start = 0usize;
    while start < text.len() {
        let rest = &text[start..];
        let fit = truncate_to_width(rest, max_width);
        if fit == rest.len() {
            ranges.push((start, text.len()));
            break;
        }
        if fit == 0 {
            let ch_len = rest.chars().next().map_or(1, char::len_utf8);
            ranges.push((start, start + ch_len));
            start += ch_len;
            continue;
        }

        // A space right after the window is a clean break too.
        let window = if rest[fit..].starts_with(' ') {
            &rest[..=fit]
        } else {
            &rest[..fit]
        };
        let (line_end, next) = match window.rfind(' ') {
            Some(space) if space > 0 => (start + space, start + space + 1),
            _ => (start + fit, start + fit),
        };
        ranges.push((start, line_end));
        start = next;
        while start < text.len() && text.as_bytes()[start] == b' ' {
            start += 1;
        }
    }

    if ranges.is_empty() {
        ranges.push((0, 0));
    }
    ranges
}

#[cfg(test)]
#[path = "../../tests/unit/core/text_window.rs"]
mod tests;
