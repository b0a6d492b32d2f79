//! 文档呈现：`RenderedBlock` → 带样式的终端行
//!
//! `present` 是唯一对 `RenderedBlock` 做穷尽匹配的地方；新增块类型时编译器
//! 会在这里报错。输出与终端库无关，由 app 层映射为 ratatui 样式。

use crate::core::text_window::{display_width, truncate_to_width, wrap_ranges};
use crate::kernel::diagram::{DiagramCache, DiagramSlot};
use crate::kernel::markdown::{InlineKind, InlineText, ListItem, RenderedBlock, TableAlign};
use crate::kernel::syntax::{highlight_snippet, HighlightKind, LanguageId};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const QUOTE_BAR: &str = "│ ";
const CODE_BAR: &str = "│ ";
const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocSpanKind {
    Syntax(HighlightKind),
    Inline(InlineKind),
    Heading(u8),
    QuoteBar,
    Quote,
    ListMarker,
    TaskDone,
    TableBorder,
    TableHeader,
    CodeBorder,
    Code,
    DiagramPending,
    Diagram,
    DiagramError,
    Rule,
    Raw,
}

/// Byte range within `DocLine::text`. Spans may overlap; later spans win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocSpan {
    pub start: usize,
    pub end: usize,
    pub kind: DocSpanKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocLine {
    pub text: String,
    pub spans: Vec<DocSpan>,
}

impl DocLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn styled(text: impl Into<String>, kind: DocSpanKind) -> Self {
        let mut line = Self::plain(text);
        line.mark(0, line.text.len(), kind);
        line
    }

    pub fn width(&self) -> usize {
        display_width(&self.text)
    }

    pub fn has_kind(&self, kind: DocSpanKind) -> bool {
        self.spans.iter().any(|s| s.kind == kind)
    }

    fn push(&mut self, s: &str, kind: Option<DocSpanKind>) {
        let start = self.text.len();
        self.text.push_str(s);
        if let Some(kind) = kind {
            self.mark(start, self.text.len(), kind);
        }
    }

    fn mark(&mut self, start: usize, end: usize, kind: DocSpanKind) {
        if end > start {
            self.spans.push(DocSpan { start, end, kind });
        }
    }

    fn prefixed(mut self, prefix: &str, kind: DocSpanKind) -> Self {
        let shift = prefix.len();
        self.text.insert_str(0, prefix);
        for span in &mut self.spans {
            span.start += shift;
            span.end += shift;
        }
        self.spans.insert(
            0,
            DocSpan {
                start: 0,
                end: shift,
                kind,
            },
        );
        self
    }
}

/// Lays blocks out for a viewport `width` cells wide, one blank line between
/// blocks. Diagrams come from `diagrams`; a missing entry shows as pending.
pub fn present(blocks: &[RenderedBlock], width: u16, diagrams: &DiagramCache) -> Vec<DocLine> {
    let mut out = Vec::new();
    if width == 0 {
        return out;
    }
    present_into(&mut out, blocks, width as usize, diagrams);
    out
}

fn present_into(
    out: &mut Vec<DocLine>,
    blocks: &[RenderedBlock],
    width: usize,
    diagrams: &DiagramCache,
) {
    for (idx, block) in blocks.iter().enumerate() {
        if idx > 0 {
            out.push(DocLine::default());
        }
        match block {
            RenderedBlock::Heading { level, text } => push_heading(out, *level, text, width),
            RenderedBlock::Paragraph(text) => {
                push_inline(out, text, width, Prefix::NONE, None);
            }
            RenderedBlock::CodeBlock { language, code } => {
                push_code(out, language.as_deref(), code);
            }
            RenderedBlock::Diagram { language, source } => {
                push_diagram(out, language, source, diagrams);
            }
            RenderedBlock::Table {
                aligns,
                header,
                rows,
            } => push_table(out, aligns, header, rows, width),
            RenderedBlock::List { items, .. } => push_list(out, items, width),
            RenderedBlock::BlockQuote(inner) => {
                let mut quoted = Vec::new();
                present_into(
                    &mut quoted,
                    inner,
                    width.saturating_sub(display_width(QUOTE_BAR)).max(1),
                    diagrams,
                );
                out.extend(quoted.into_iter().map(|mut line| {
                    let len = line.text.len();
                    line.spans.insert(
                        0,
                        DocSpan {
                            start: 0,
                            end: len,
                            kind: DocSpanKind::Quote,
                        },
                    );
                    line.prefixed(QUOTE_BAR, DocSpanKind::QuoteBar)
                }));
            }
            RenderedBlock::Rule => {
                out.push(DocLine::styled("─".repeat(width), DocSpanKind::Rule));
            }
            RenderedBlock::Generic(text) => {
                for line in text.lines() {
                    let line = InlineText::plain(line);
                    push_inline(out, &line, width, Prefix::NONE, Some(DocSpanKind::Raw));
                }
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Prefix<'a> {
    first: &'a str,
    rest: &'a str,
    kind: Option<DocSpanKind>,
}

impl Prefix<'_> {
    const NONE: Prefix<'static> = Prefix {
        first: "",
        rest: "",
        kind: None,
    };
}

/// Wraps inline text to `width`, carrying its spans onto every wrapped line.
fn push_inline(
    out: &mut Vec<DocLine>,
    text: &InlineText,
    width: usize,
    prefix: Prefix<'_>,
    base: Option<DocSpanKind>,
) {
    let prefix_w = display_width(prefix.first).max(display_width(prefix.rest));
    let avail = width.saturating_sub(prefix_w).max(1);

    for (i, (start, end)) in wrap_ranges(&text.text, avail).into_iter().enumerate() {
        let mut line = DocLine::default();
        line.push(if i == 0 { prefix.first } else { prefix.rest }, prefix.kind);
        let offset = line.text.len();
        line.push(&text.text[start..end], base);
        for span in &text.spans {
            let s = span.start.max(start);
            let e = span.end.min(end);
            if s < e {
                line.mark(
                    offset + s - start,
                    offset + e - start,
                    DocSpanKind::Inline(span.kind),
                );
            }
        }
        out.push(line);
    }
}

fn push_heading(out: &mut Vec<DocLine>, level: u8, text: &InlineText, width: usize) {
    let kind = DocSpanKind::Heading(level);
    let first = out.len();
    push_inline(out, text, width, Prefix::NONE, Some(kind));

    let rule = match level {
        1 => "═",
        2 => "─",
        _ => return,
    };
    let widest = out[first..].iter().map(DocLine::width).max().unwrap_or(0);
    out.push(DocLine::styled(rule.repeat(widest.clamp(1, width)), kind));
}

fn push_code(out: &mut Vec<DocLine>, language: Option<&str>, code: &str) {
    let code = code.replace('\t', &" ".repeat(TAB_WIDTH));
    let highlights = language
        .and_then(LanguageId::from_tag)
        .map(|lang| highlight_snippet(lang, &code));

    let mut top = DocLine::styled("┌─", DocSpanKind::CodeBorder);
    if let Some(tag) = language.filter(|t| !t.is_empty()) {
        top.push(" ", None);
        top.push(tag, Some(DocSpanKind::CodeBorder));
    }
    out.push(top);

    for (idx, raw) in code.split('\n').enumerate() {
        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let mut line = DocLine::default();
        line.push(CODE_BAR, Some(DocSpanKind::CodeBorder));
        let offset = line.text.len();
        line.push(text, Some(DocSpanKind::Code));
        let spans = highlights.as_ref().and_then(|h| h.get(idx));
        for span in spans.into_iter().flatten() {
            let end = span.end.min(text.len());
            line.mark(
                offset + span.start,
                offset + end,
                DocSpanKind::Syntax(span.kind),
            );
        }
        out.push(line);
    }

    out.push(DocLine::styled("└─", DocSpanKind::CodeBorder));
}

fn push_diagram(out: &mut Vec<DocLine>, language: &str, source: &str, diagrams: &DiagramCache) {
    let render = match diagrams.get(language, source) {
        Some(DiagramSlot::Ready(render)) => render,
        Some(DiagramSlot::Pending) | None => {
            out.push(DocLine::styled(
                format!("⋯ rendering {language} diagram"),
                DocSpanKind::DiagramPending,
            ));
            return;
        }
    };

    match &render.result {
        Ok(art) => out.extend(
            art.iter()
                .map(|line| DocLine::styled(line.as_str(), DocSpanKind::Diagram)),
        ),
        Err(err) => {
            out.push(DocLine::styled(
                format!("⚠ diagram error: {err}"),
                DocSpanKind::DiagramError,
            ));
            for line in source.lines() {
                out.push(DocLine::styled(line, DocSpanKind::Code).prefixed(
                    CODE_BAR,
                    DocSpanKind::CodeBorder,
                ));
            }
        }
    }
}

fn push_table(
    out: &mut Vec<DocLine>,
    aligns: &[TableAlign],
    header: &[InlineText],
    rows: &[Vec<InlineText>],
    width: usize,
) {
    let cols = rows
        .iter()
        .map(Vec::len)
        .chain([header.len(), aligns.len()])
        .max()
        .unwrap_or(0);
    if cols == 0 {
        return;
    }

    let mut widths = vec![1usize; cols];
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        for (col, cell) in row.iter().enumerate() {
            widths[col] = widths[col].max(display_width(&cell.text));
        }
    }
    // "│ a │ b │": three cells of chrome per column plus the closing bar.
    let budget = width.saturating_sub(cols * 3 + 1);
    while widths.iter().sum::<usize>() > budget {
        let Some(widest) = widths.iter_mut().filter(|w| **w > 3).max_by_key(|w| **w) else {
            break;
        };
        *widest -= 1;
    }

    out.push(table_border(&widths, "┌", "┬", "┐"));
    out.push(table_row(header, aligns, &widths, true));
    out.push(table_border(&widths, "├", "┼", "┤"));
    for row in rows {
        out.push(table_row(row, aligns, &widths, false));
    }
    out.push(table_border(&widths, "└", "┴", "┘"));
}

fn table_border(widths: &[usize], left: &str, mid: &str, right: &str) -> DocLine {
    let inner = widths
        .iter()
        .map(|w| "─".repeat(w + 2))
        .collect::<Vec<_>>()
        .join(mid);
    DocLine::styled(format!("{left}{inner}{right}"), DocSpanKind::TableBorder)
}

fn table_row(
    cells: &[InlineText],
    aligns: &[TableAlign],
    widths: &[usize],
    header: bool,
) -> DocLine {
    let mut line = DocLine::styled("│", DocSpanKind::TableBorder);
    for (col, &width) in widths.iter().enumerate() {
        let cell = cells.get(col);
        let text = cell.map_or("", |c| c.text.as_str());
        let end = truncate_to_width(text, width);
        let shown = &text[..end];
        let pad = width.saturating_sub(display_width(shown));
        let (left, right) = match aligns.get(col).copied().unwrap_or(TableAlign::None) {
            TableAlign::Right => (pad, 0),
            TableAlign::Center => (pad / 2, pad - pad / 2),
            TableAlign::Left | TableAlign::None => (0, pad),
        };

        line.push(&" ".repeat(left + 1), None);
        let offset = line.text.len();
        line.push(shown, header.then_some(DocSpanKind::TableHeader));
        for span in cell.map_or(&[][..], |c| c.spans.as_slice()) {
            let e = span.end.min(end);
            if span.start < e {
                line.mark(offset + span.start, offset + e, DocSpanKind::Inline(span.kind));
            }
        }
        line.push(&" ".repeat(right + 1), None);
        line.push("│", Some(DocSpanKind::TableBorder));
    }
    line
}

fn push_list(out: &mut Vec<DocLine>, items: &[ListItem], width: usize) {
    for item in items {
        let mut marker = "  ".repeat(item.depth);
        match item.ordinal {
            Some(n) => marker.push_str(&format!("{n}. ")),
            None => marker.push_str(match item.depth % 3 {
                0 => "• ",
                1 => "◦ ",
                _ => "▪ ",
            }),
        }
        if let Some(checked) = item.checked {
            marker.push_str(if checked { "[x] " } else { "[ ] " });
        }
        let hang = " ".repeat(display_width(&marker));

        let first = out.len();
        push_inline(
            out,
            &item.text,
            width,
            Prefix {
                first: &marker,
                rest: &hang,
                kind: Some(DocSpanKind::ListMarker),
            },
            None,
        );
        if item.checked == Some(true) {
            for (i, line) in out[first..].iter_mut().enumerate() {
                let lead = if i == 0 { marker.len() } else { hang.len() };
                let start = lead.min(line.text.len());
                let end = line.text.len();
                line.mark(start, end, DocSpanKind::TaskDone);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCacheKey {
    pub content_hash: u64,
    pub width: u16,
    pub diagram_revision: u64,
}

/// Last presentation, reused while blocks, width and diagram results are unchanged.
#[derive(Debug, Clone)]
pub struct RenderCache {
    key: Option<RenderCacheKey>,
    lines: Arc<Vec<DocLine>>,
}

impl Default for RenderCache {
    fn default() -> Self {
        Self {
            key: None,
            lines: Arc::new(Vec::new()),
        }
    }
}

impl RenderCache {
    pub fn key(&self) -> Option<RenderCacheKey> {
        self.key
    }

    pub fn lines(&self) -> &[DocLine] {
        self.lines.as_slice()
    }

    pub fn clear(&mut self) {
        self.key = None;
        self.lines = Arc::new(Vec::new());
    }

    /// Returns the lines and whether they came from the cache.
    pub fn get_or_present(
        &mut self,
        blocks: &[RenderedBlock],
        width: u16,
        diagrams: &DiagramCache,
    ) -> (Arc<Vec<DocLine>>, bool) {
        let key = RenderCacheKey {
            content_hash: blocks_hash(blocks),
            width,
            diagram_revision: diagrams.revision(),
        };
        if self.key == Some(key) {
            return (Arc::clone(&self.lines), true);
        }

        self.lines = Arc::new(present(blocks, width, diagrams));
        self.key = Some(key);
        (Arc::clone(&self.lines), false)
    }
}

pub fn blocks_hash(blocks: &[RenderedBlock]) -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    blocks.hash(&mut hasher);
    hasher.finish()
}

pub fn clamp_scroll_offset(scroll: usize, total_lines: usize, view_height: usize) -> usize {
    if view_height == 0 {
        return 0;
    }
    let max_scroll = total_lines.saturating_sub(view_height);
    scroll.min(max_scroll)
}

#[cfg(test)]
#[path = "../../tests/unit/views/doc.rs"]
mod tests;
