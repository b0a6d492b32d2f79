//! Block-level pass: lines → `RenderedBlock`s.

use super::inline::parse_inline;
use super::{table, InlineText, ListItem, RenderedBlock};
use crate::kernel::diagram::is_diagram_language;

const MAX_QUOTE_DEPTH: usize = 16;
const TAB_STOP: usize = 4;

pub(super) fn parse_blocks(text: &str) -> Vec<RenderedBlock> {
    let lines: Vec<&str> = text.lines().collect();
    BlockParser::new(lines, 0).run()
}

struct BlockParser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    quote_depth: usize,
    blocks: Vec<RenderedBlock>,
}

impl<'a> BlockParser<'a> {
    fn new(lines: Vec<&'a str>, quote_depth: usize) -> Self {
        Self {
            lines,
            pos: 0,
            quote_depth,
            blocks: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<RenderedBlock> {
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if is_blank(line) {
                self.pos += 1;
                continue;
            }

            if indent_width(line) >= TAB_STOP {
                self.indented_code();
                continue;
            }
            if let Some(fence) = Fence::open(line) {
                self.fenced_code(fence);
                continue;
            }
            if let Some((level, content)) = atx_heading(line) {
                self.blocks.push(RenderedBlock::Heading {
                    level,
                    text: parse_inline(content),
                });
                self.pos += 1;
                continue;
            }
            if is_thematic_break(line) {
                self.blocks.push(RenderedBlock::Rule);
                self.pos += 1;
                continue;
            }
            if quote_content(line).is_some() {
                self.block_quote();
                continue;
            }
            if let Some(marker) = ListMarker::parse(line) {
                self.list(marker);
                continue;
            }
            if self.table_starts_at(self.pos) {
                self.table();
                continue;
            }
            if is_html_start(line) {
                self.html();
                continue;
            }
            self.paragraph();
        }
        self.blocks
    }

    fn table_starts_at(&self, pos: usize) -> bool {
        match (self.lines.get(pos), self.lines.get(pos + 1)) {
            (Some(header), Some(separator)) => table::detect_header(header, separator).is_some(),
            _ => false,
        }
    }

    fn paragraph(&mut self) {
        let mut parts: Vec<&str> = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if is_blank(line) {
                break;
            }
            if !parts.is_empty() {
                if let Some(level) = setext_level(line) {
                    self.pos += 1;
                    let text = join_paragraph(&parts);
                    self.blocks.push(RenderedBlock::Heading {
                        level,
                        text: parse_inline(&text),
                    });
                    return;
                }
                if interrupts_paragraph(line) || self.table_starts_at(self.pos) {
                    break;
                }
            }
            parts.push(line);
            self.pos += 1;
        }

        let text = join_paragraph(&parts);
        self.blocks.push(RenderedBlock::Paragraph(parse_inline(&text)));
    }

    fn fenced_code(&mut self, fence: Fence<'a>) {
        self.pos += 1;
        let mut body: Vec<&str> = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            self.pos += 1;
            if fence.is_closed_by(line) {
                break;
            }
            body.push(strip_columns(line, fence.indent));
        }

        let code = body.join("\n");
        let tag = fence.info.split_whitespace().next().unwrap_or_default();
        let block = if is_diagram_language(tag) {
            RenderedBlock::Diagram {
                language: tag.to_ascii_lowercase(),
                source: code,
            }
        } else {
            RenderedBlock::CodeBlock {
                language: (!tag.is_empty()).then(|| tag.to_string()),
                code,
            }
        };
        self.blocks.push(block);
    }

    fn indented_code(&mut self) {
        let mut body: Vec<&str> = Vec::new();
        let mut end = self.pos;
        let mut idx = self.pos;
        while idx < self.lines.len() {
            let line = self.lines[idx];
            if is_blank(line) {
                body.push("");
            } else if indent_width(line) >= TAB_STOP {
                body.push(strip_columns(line, TAB_STOP));
                end = idx + 1;
            } else {
                break;
            }
            idx += 1;
        }
        body.truncate(end - self.pos);
        self.pos = end;
        self.blocks.push(RenderedBlock::CodeBlock {
            language: None,
            code: body.join("\n"),
        });
    }

    fn block_quote(&mut self) {
        let mut inner: Vec<&'a str> = Vec::new();
        let mut last_was_text = false;
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if let Some(content) = quote_content(line) {
                last_was_text = !is_blank(content);
                inner.push(content);
            } else if last_was_text && !is_blank(line) && !interrupts_paragraph(line) {
                // Lazy continuation of a quoted paragraph.
                inner.push(line);
            } else {
                break;
            }
            self.pos += 1;
        }

        if self.quote_depth >= MAX_QUOTE_DEPTH {
            let text = join_paragraph(&inner);
            self.blocks
                .push(RenderedBlock::BlockQuote(vec![RenderedBlock::Paragraph(
                    InlineText::plain(text),
                )]));
            return;
        }
        let blocks = BlockParser::new(inner, self.quote_depth + 1).run();
        self.blocks.push(RenderedBlock::BlockQuote(blocks));
    }

    fn list(&mut self, first: ListMarker<'a>) {
        let ordered = first.ordinal.is_some();
        let start = first.ordinal;
        // (marker indent, content indent) per open nesting level.
        let mut levels: Vec<(usize, usize)> = Vec::new();
        let mut items: Vec<ListItem> = Vec::new();
        let mut current: Option<PendingItem<'a>> = None;
        let mut after_blank = false;

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];

            if is_blank(line) {
                let next = (self.pos + 1..self.lines.len()).find(|&i| !is_blank(self.lines[i]));
                let Some(next) = next else {
                    break;
                };
                let continues = match ListMarker::parse(self.lines[next]) {
                    Some(marker) => !is_thematic_break(self.lines[next])
                        && !top_level_kind_changes(&levels, &marker, ordered),
                    None => current
                        .as_ref()
                        .is_some_and(|item| indent_width(self.lines[next]) >= item.content_indent),
                };
                if !continues {
                    break;
                }
                after_blank = true;
                self.pos = next;
                continue;
            }

            if is_thematic_break(line) {
                break;
            }

            if let Some(marker) = ListMarker::parse(line) {
                if top_level_kind_changes(&levels, &marker, ordered) {
                    break;
                }
                if let Some(done) = current.take() {
                    items.push(done.finish());
                }
                let depth = nest_level(&mut levels, marker.indent, marker.content_indent);
                current = Some(PendingItem::new(depth, &marker));
                after_blank = false;
                self.pos += 1;
                continue;
            }

            let Some(item) = current.as_mut() else {
                break;
            };
            if Fence::open(line.trim_start()).is_some() {
                break;
            }
            let indented = indent_width(line) >= item.content_indent;
            if after_blank && !indented {
                break;
            }
            if !indented && interrupts_paragraph(line) {
                break;
            }
            item.parts.push(line.trim());
            self.pos += 1;
        }

        if let Some(done) = current.take() {
            items.push(done.finish());
        }
        self.blocks.push(RenderedBlock::List {
            ordered,
            start,
            items,
        });
    }

    fn table(&mut self) {
        let header_cells = table::split_cells(self.lines[self.pos]).unwrap_or_default();
        let aligns = table::detect_header(self.lines[self.pos], self.lines[self.pos + 1])
            .unwrap_or_default();
        let columns = header_cells.len();
        let header: Vec<InlineText> = header_cells.into_iter().map(parse_inline).collect();
        self.pos += 2;

        let mut rows = Vec::new();
        while self.pos < self.lines.len() {
            let line = self.lines[self.pos];
            if is_blank(line) {
                break;
            }
            let Some(cells) = table::split_cells(line) else {
                break;
            };
            if cells.len() != columns {
                break;
            }
            rows.push(cells.into_iter().map(parse_inline).collect());
            self.pos += 1;
        }

        self.blocks.push(RenderedBlock::Table {
            aligns,
            header,
            rows,
        });
    }

    fn html(&mut self) {
        let mut raw: Vec<&str> = Vec::new();
        while self.pos < self.lines.len() && !is_blank(self.lines[self.pos]) {
            raw.push(self.lines[self.pos]);
            self.pos += 1;
        }
        self.blocks.push(RenderedBlock::Generic(raw.join("\n")));
    }
}

struct PendingItem<'a> {
    depth: usize,
    ordinal: Option<u64>,
    checked: Option<bool>,
    content_indent: usize,
    parts: Vec<&'a str>,
}

impl<'a> PendingItem<'a> {
    fn new(depth: usize, marker: &ListMarker<'a>) -> Self {
        let (checked, content) = task_state(marker.content);
        let parts = if content.trim().is_empty() {
            Vec::new()
        } else {
            vec![content.trim()]
        };
        Self {
            depth,
            ordinal: marker.ordinal,
            checked,
            content_indent: marker.content_indent,
            parts,
        }
    }

    fn finish(self) -> ListItem {
        ListItem {
            depth: self.depth,
            ordinal: self.ordinal,
            checked: self.checked,
            text: parse_inline(&join_paragraph(&self.parts)),
        }
    }
}

fn task_state(content: &str) -> (Option<bool>, &str) {
    let checked = match content.get(..3) {
        Some("[ ]") => Some(false),
        Some("[x]") | Some("[X]") => Some(true),
        _ => None,
    };
    match checked {
        Some(state) if content.len() == 3 || content[3..].starts_with([' ', '\t']) => {
            (Some(state), &content[3..])
        }
        _ => (None, content),
    }
}

/// A top-level item of the other list kind starts a new list.
fn top_level_kind_changes(levels: &[(usize, usize)], marker: &ListMarker<'_>, ordered: bool) -> bool {
    let is_top_level = levels
        .first()
        .map_or(true, |&(_, content_indent)| marker.indent < content_indent);
    is_top_level && marker.ordinal.is_some() != ordered
}

/// Nesting depth for a marker at `indent`, updating the open levels.
fn nest_level(levels: &mut Vec<(usize, usize)>, indent: usize, content_indent: usize) -> usize {
    while let Some(&(marker_indent, parent_content)) = levels.last() {
        if indent >= parent_content {
            break;
        }
        levels.pop();
        if indent >= marker_indent || levels.is_empty() {
            break;
        }
    }
    levels.push((indent, content_indent));
    levels.len() - 1
}

struct ListMarker<'a> {
    indent: usize,
    ordinal: Option<u64>,
    content_indent: usize,
    content: &'a str,
}

impl<'a> ListMarker<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let indent = indent_width(line);
        let trimmed = line.trim_start();
        let bytes = trimmed.as_bytes();
        let first = *bytes.first()?;

        let (ordinal, marker_len) = if matches!(first, b'-' | b'*' | b'+') {
            (None, 1)
        } else if first.is_ascii_digit() {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > 9 || !matches!(bytes.get(digits), Some(b'.') | Some(b')')) {
                return None;
            }
            let number = trimmed[..digits].parse::<u64>().ok()?;
            (Some(number), digits + 1)
        } else {
            return None;
        };

        let rest = &trimmed[marker_len..];
        if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
            return None;
        }
        let content = rest.trim_start();
        let padding = (rest.len() - content.len()).clamp(1, 4);
        Some(Self {
            indent,
            ordinal,
            content_indent: indent + marker_len + padding,
            content,
        })
    }
}

struct Fence<'a> {
    marker: u8,
    len: usize,
    indent: usize,
    info: &'a str,
}

impl<'a> Fence<'a> {
    fn open(line: &'a str) -> Option<Self> {
        let indent = indent_width(line);
        if indent >= TAB_STOP {
            return None;
        }
        let trimmed = line.trim_start();
        let bytes = trimmed.as_bytes();
        let marker = *bytes.first()?;
        if marker != b'`' && marker != b'~' {
            return None;
        }
        let len = bytes.iter().take_while(|&&b| b == marker).count();
        if len < 3 {
            return None;
        }
        let info = trimmed[len..].trim();
        if marker == b'`' && info.contains('`') {
            return None;
        }
        Some(Self {
            marker,
            len,
            indent,
            info,
        })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        if indent_width(line) >= TAB_STOP {
            return false;
        }
        let trimmed = line.trim();
        let run = trimmed
            .bytes()
            .take_while(|&b| b == self.marker)
            .count();
        run >= self.len && run == trimmed.len()
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += TAB_STOP - width % TAB_STOP,
            _ => break,
        }
    }
    width
}

/// Removes up to `columns` columns of leading whitespace.
fn strip_columns(line: &str, columns: usize) -> &str {
    let mut width = 0;
    for (idx, ch) in line.char_indices() {
        if width >= columns {
            return &line[idx..];
        }
        match ch {
            ' ' => width += 1,
            '\t' => width += TAB_STOP - width % TAB_STOP,
            _ => return &line[idx..],
        }
    }
    ""
}

fn atx_heading(line: &str) -> Option<(u8, &str)> {
    if indent_width(line) >= TAB_STOP {
        return None;
    }
    let trimmed = line.trim_start();
    let hashes = trimmed.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }

    let mut content = rest.trim();
    let without_closing = content.trim_end_matches('#');
    if without_closing.is_empty() {
        content = "";
    } else if without_closing.len() < content.len() && without_closing.ends_with([' ', '\t']) {
        content = without_closing.trim_end();
    }
    Some((hashes as u8, content))
}

fn is_thematic_break(line: &str) -> bool {
    if indent_width(line) >= TAB_STOP {
        return false;
    }
    let trimmed = line.trim();
    let Some(marker) = trimmed.chars().next() else {
        return false;
    };
    if !matches!(marker, '-' | '*' | '_') {
        return false;
    }
    let count = trimmed.chars().filter(|&c| c == marker).count();
    count >= 3 && trimmed.chars().all(|c| c == marker || c == ' ' || c == '\t')
}

fn setext_level(line: &str) -> Option<u8> {
    if indent_width(line) >= TAB_STOP {
        return None;
    }
    let trimmed = line.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b == b'=') {
        Some(1)
    } else if !trimmed.is_empty() && trimmed.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

fn quote_content(line: &str) -> Option<&str> {
    if indent_width(line) >= TAB_STOP {
        return None;
    }
    let rest = line.trim_start().strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn is_html_start(line: &str) -> bool {
    let trimmed = line.trim_start();
    let Some(rest) = trimmed.strip_prefix('<') else {
        return false;
    };
    let Some(first) = rest.chars().next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || matches!(first, '/' | '!' | '?')) {
        return false;
    }
    let token = rest.split(['>', ' ']).next().unwrap_or_default();
    !token.contains("://") && !token.starts_with("mailto:")
}

/// Lines that end a paragraph without a blank line in between.
fn interrupts_paragraph(line: &str) -> bool {
    if Fence::open(line).is_some()
        || atx_heading(line).is_some()
        || is_thematic_break(line)
        || quote_content(line).is_some()
        || is_html_start(line)
    {
        return true;
    }
    match ListMarker::parse(line) {
        Some(marker) if indent_width(line) < TAB_STOP => {
            !marker.content.is_empty() && marker.ordinal.map_or(true, |n| n == 1)
        }
        _ => false,
    }
}

fn join_paragraph(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        let part = part.trim();
        let part = part.strip_suffix('\\').unwrap_or(part).trim_end();
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/markdown/block.rs"]
mod tests;
