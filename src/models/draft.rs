//! 草稿缓冲区
//!
//! 职责：
//! - 文本存储（Rope）
//! - 光标管理（行 + 字素列）
//! - 行列 ↔ 字符偏移映射

use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use unicode_segmentation::UnicodeSegmentation;

fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[derive(Debug, Clone, Default)]
pub struct DraftBuffer {
    rope: Rope,
    cursor: (usize, usize),
    preferred_col: Option<usize>,
}

impl DraftBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: (0, 0),
            preferred_col: None,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// True when the buffer holds exactly `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.rope == text
    }

    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let (row, col) = self.cursor;
        self.set_cursor(row, col);
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Moves the cursor, clamped to the buffer.
    pub fn set_cursor(&mut self, row: usize, col: usize) {
        let row = row.min(self.len_lines().saturating_sub(1));
        let col = col.min(self.line_grapheme_len(row));
        self.cursor = (row, col);
        self.preferred_col = None;
    }

    /// Line `row` without its line ending.
    pub fn line(&self, row: usize) -> Option<String> {
        if row >= self.len_lines() {
            return None;
        }
        let slice = self.rope.line(row);
        let line = slice_to_cow(slice);
        Some(strip_line_ending(&line).to_string())
    }

    pub fn line_grapheme_len(&self, row: usize) -> usize {
        if row >= self.len_lines() {
            return 0;
        }
        let line = slice_to_cow(self.rope.line(row));
        strip_line_ending(&line).graphemes(true).count()
    }

    fn grapheme_to_char_index(&self, row: usize, grapheme_index: usize) -> usize {
        let line = slice_to_cow(self.rope.line(row));
        line.graphemes(true)
            .take(grapheme_index)
            .map(|g| g.chars().count())
            .sum()
    }

    fn pos_to_char(&self, (row, col): (usize, usize)) -> usize {
        self.rope.line_to_char(row) + self.grapheme_to_char_index(row, col)
    }

    fn char_to_pos(&self, char_idx: usize) -> (usize, usize) {
        let char_idx = char_idx.min(self.rope.len_chars());
        let row = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(row);
        let prefix = self.rope.slice(line_start..char_idx).to_string();
        (row, prefix.graphemes(true).count())
    }

    /// Byte offset of the cursor inside its line.
    pub fn cursor_byte_in_line(&self) -> usize {
        let (row, col) = self.cursor;
        self.line(row)
            .map(|line| line.graphemes(true).take(col).map(str::len).sum())
            .unwrap_or(0)
    }

    pub fn insert_char(&mut self, ch: char) {
        let offset = self.pos_to_char(self.cursor);
        self.rope.insert_char(offset, ch);
        self.cursor = self.char_to_pos(offset + 1);
        self.preferred_col = None;
    }

    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let offset = self.pos_to_char(self.cursor);
        self.rope.insert(offset, s);
        self.cursor = self.char_to_pos(offset + s.chars().count());
        self.preferred_col = None;
    }

    /// Deletes the grapheme (or line break) before the cursor.
    pub fn backspace(&mut self) -> bool {
        let (row, col) = self.cursor;
        let (start, end) = if col > 0 {
            (self.pos_to_char((row, col - 1)), self.pos_to_char((row, col)))
        } else if row > 0 {
            let end = self.rope.line_to_char(row);
            let crlf =
                end >= 2 && self.rope.char(end - 2) == '\r' && self.rope.char(end - 1) == '\n';
            (end - if crlf { 2 } else { 1 }, end)
        } else {
            return false;
        };

        self.rope.remove(start..end);
        self.cursor = self.char_to_pos(start);
        self.preferred_col = None;
        true
    }

    /// Deletes the grapheme (or line break) under the cursor.
    pub fn delete(&mut self) -> bool {
        let (row, col) = self.cursor;
        let start = self.pos_to_char((row, col));
        let end = if col < self.line_grapheme_len(row) {
            self.pos_to_char((row, col + 1))
        } else if row + 1 < self.len_lines() {
            self.rope.line_to_char(row + 1)
        } else {
            return false;
        };

        self.rope.remove(start..end);
        self.preferred_col = None;
        true
    }

    pub fn move_left(&mut self) {
        let (row, col) = self.cursor;
        if col > 0 {
            self.cursor = (row, col - 1);
        } else if row > 0 {
            self.cursor = (row - 1, self.line_grapheme_len(row - 1));
        }
        self.preferred_col = None;
    }

    pub fn move_right(&mut self) {
        let (row, col) = self.cursor;
        if col < self.line_grapheme_len(row) {
            self.cursor = (row, col + 1);
        } else if row + 1 < self.len_lines() {
            self.cursor = (row + 1, 0);
        }
        self.preferred_col = None;
    }

    pub fn move_up(&mut self) {
        let (row, col) = self.cursor;
        if row == 0 {
            self.cursor = (0, 0);
            return;
        }
        let goal = *self.preferred_col.get_or_insert(col);
        self.cursor = (row - 1, goal.min(self.line_grapheme_len(row - 1)));
    }

    pub fn move_down(&mut self) {
        let (row, col) = self.cursor;
        if row + 1 >= self.len_lines() {
            self.cursor = (row, self.line_grapheme_len(row));
            return;
        }
        let goal = *self.preferred_col.get_or_insert(col);
        self.cursor = (row + 1, goal.min(self.line_grapheme_len(row + 1)));
    }

    pub fn move_line_start(&mut self) {
        self.cursor.1 = 0;
        self.preferred_col = None;
    }

    pub fn move_line_end(&mut self) {
        self.cursor.1 = self.line_grapheme_len(self.cursor.0);
        self.preferred_col = None;
    }

    pub fn move_doc_start(&mut self) {
        self.cursor = (0, 0);
        self.preferred_col = None;
    }

    pub fn move_doc_end(&mut self) {
        let row = self.len_lines().saturating_sub(1);
        self.cursor = (row, self.line_grapheme_len(row));
        self.preferred_col = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/draft.rs"]
mod tests;
