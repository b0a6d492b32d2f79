//! Growable character grid with box-drawing junction merging.
//!
//! Line cells record which directions ("arms") leave the cell; overlapping
//! lines merge into the matching junction glyph (`├`, `┼`, ...).

use unicode_width::UnicodeWidthChar;

pub const UP: u8 = 1;
pub const DOWN: u8 = 2;
pub const LEFT: u8 = 4;
pub const RIGHT: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Light,
    Dotted,
    Thick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Empty,
    Line { arms: u8, style: LineStyle },
    Text(char),
    /// Right half of a double-width character.
    Wide,
}

#[derive(Debug, Default)]
pub struct Canvas {
    rows: Vec<Vec<Cell>>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_mut(&mut self, x: usize, y: usize) -> &mut Cell {
        if self.rows.len() <= y {
            self.rows.resize_with(y + 1, Vec::new);
        }
        let row = &mut self.rows[y];
        if row.len() <= x {
            row.resize(x + 1, Cell::Empty);
        }
        &mut row[x]
    }

    fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(Cell::Empty)
    }

    pub fn is_empty_at(&self, x: usize, y: usize) -> bool {
        self.cell(x, y) == Cell::Empty
    }

    /// Adds arms to a cell. Text already in the cell wins.
    pub fn add_arms(&mut self, x: usize, y: usize, arms: u8, style: LineStyle) {
        let cell = self.cell_mut(x, y);
        *cell = match *cell {
            Cell::Empty => Cell::Line { arms, style },
            Cell::Line {
                arms: existing,
                style: old,
            } => Cell::Line {
                arms: existing | arms,
                style: if old == style { old } else { LineStyle::Light },
            },
            other => other,
        };
    }

    pub fn hline(&mut self, y: usize, x0: usize, x1: usize, style: LineStyle) {
        let (from, to) = (x0.min(x1), x0.max(x1));
        if from == to {
            return;
        }
        for x in from..=to {
            let mut arms = 0;
            if x > from {
                arms |= LEFT;
            }
            if x < to {
                arms |= RIGHT;
            }
            self.add_arms(x, y, arms, style);
        }
    }

    pub fn vline(&mut self, x: usize, y0: usize, y1: usize, style: LineStyle) {
        let (from, to) = (y0.min(y1), y0.max(y1));
        if from == to {
            return;
        }
        for y in from..=to {
            let mut arms = 0;
            if y > from {
                arms |= UP;
            }
            if y < to {
                arms |= DOWN;
            }
            self.add_arms(x, y, arms, style);
        }
    }

    /// Box outline with its top-left corner at `(x, y)`.
    pub fn draw_box(&mut self, x: usize, y: usize, width: usize, height: usize) {
        if width < 2 || height < 2 {
            return;
        }
        let right = x + width - 1;
        let bottom = y + height - 1;
        self.hline(y, x, right, LineStyle::Light);
        self.hline(bottom, x, right, LineStyle::Light);
        self.vline(x, y, bottom, LineStyle::Light);
        self.vline(right, y, bottom, LineStyle::Light);
    }

    pub fn clear(&mut self, x: usize, y: usize, width: usize, height: usize) {
        for row in y..y + height {
            for col in x..x + width {
                *self.cell_mut(col, row) = Cell::Empty;
            }
        }
    }

    /// Overwrites cells with text, returning the width written.
    pub fn text(&mut self, x: usize, y: usize, text: &str) -> usize {
        let mut col = x;
        for ch in text.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if w == 0 {
                continue;
            }
            *self.cell_mut(col, y) = Cell::Text(ch);
            if w == 2 {
                *self.cell_mut(col + 1, y) = Cell::Wide;
            }
            col += w;
        }
        col - x
    }

    /// Writes text only if every target cell is empty.
    pub fn text_if_free(&mut self, x: usize, y: usize, text: &str) -> bool {
        let width = crate::core::text_window::display_width(text);
        if (x..x + width).any(|col| !self.is_empty_at(col, y)) {
            return false;
        }
        self.text(x, y, text);
        true
    }

    pub fn glyph(&mut self, x: usize, y: usize, ch: char) {
        *self.cell_mut(x, y) = Cell::Text(ch);
    }

    pub fn into_lines(self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .rows
            .into_iter()
            .map(|row| {
                let mut line = String::with_capacity(row.len());
                for cell in row {
                    match cell {
                        Cell::Empty => line.push(' '),
                        Cell::Line { arms, style } => line.push(line_glyph(arms, style)),
                        Cell::Text(ch) => line.push(ch),
                        Cell::Wide => {}
                    }
                }
                line.truncate(line.trim_end().len());
                line
            })
            .collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        lines
    }
}

fn line_glyph(arms: u8, style: LineStyle) -> char {
    let vertical = arms & !(UP | DOWN) == 0;
    let horizontal = arms & !(LEFT | RIGHT) == 0;
    match style {
        LineStyle::Dotted if vertical => return '┆',
        LineStyle::Dotted if horizontal => return '┄',
        LineStyle::Thick => {
            if let Some(ch) = thick_glyph(arms) {
                return ch;
            }
        }
        _ => {}
    }
    light_glyph(arms)
}

fn light_glyph(arms: u8) -> char {
    match arms {
        a if a == UP | DOWN || a == UP || a == DOWN => '│',
        a if a == LEFT | RIGHT || a == LEFT || a == RIGHT => '─',
        a if a == DOWN | RIGHT => '┌',
        a if a == DOWN | LEFT => '┐',
        a if a == UP | RIGHT => '└',
        a if a == UP | LEFT => '┘',
        a if a == UP | DOWN | RIGHT => '├',
        a if a == UP | DOWN | LEFT => '┤',
        a if a == DOWN | LEFT | RIGHT => '┬',
        a if a == UP | LEFT | RIGHT => '┴',
        a if a == UP | DOWN | LEFT | RIGHT => '┼',
        _ => ' ',
    }
}

fn thick_glyph(arms: u8) -> Option<char> {
    Some(match arms {
        a if a == UP | DOWN || a == UP || a == DOWN => '┃',
        a if a == LEFT | RIGHT || a == LEFT || a == RIGHT => '━',
        a if a == DOWN | RIGHT => '┏',
        a if a == DOWN | LEFT => '┓',
        a if a == UP | RIGHT => '┗',
        a if a == UP | LEFT => '┛',
        _ => return None,
    })
}
