//! Markdown → `RenderedBlock` transformer.
//!
//! `transform` is a pure function of the input text: the same text always
//! yields the same blocks, in source order. Malformed constructs degrade to
//! plain text locally and never abort the rest of the document.

mod block;
mod inline;
mod table;

pub use inline::{parse_inline, InlineKind, InlineSpan, InlineText, Link};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAlign {
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListItem {
    pub depth: usize,
    /// Source number for ordered items, `None` for bullets.
    pub ordinal: Option<u64>,
    /// `Some` for task-list items.
    pub checked: Option<bool>,
    pub text: InlineText,
}

/// One structural unit of a transformed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderedBlock {
    Heading {
        level: u8,
        text: InlineText,
    },
    Paragraph(InlineText),
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Diagram {
        language: String,
        source: String,
    },
    Table {
        aligns: Vec<TableAlign>,
        header: Vec<InlineText>,
        rows: Vec<Vec<InlineText>>,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    BlockQuote(Vec<RenderedBlock>),
    Rule,
    /// Raw HTML and anything else shown verbatim.
    Generic(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Heading,
    Paragraph,
    CodeBlock,
    Diagram,
    Table,
    List,
    BlockQuote,
    Rule,
    Generic,
}

impl RenderedBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            RenderedBlock::Heading { .. } => BlockKind::Heading,
            RenderedBlock::Paragraph(_) => BlockKind::Paragraph,
            RenderedBlock::CodeBlock { .. } => BlockKind::CodeBlock,
            RenderedBlock::Diagram { .. } => BlockKind::Diagram,
            RenderedBlock::Table { .. } => BlockKind::Table,
            RenderedBlock::List { .. } => BlockKind::List,
            RenderedBlock::BlockQuote(_) => BlockKind::BlockQuote,
            RenderedBlock::Rule => BlockKind::Rule,
            RenderedBlock::Generic(_) => BlockKind::Generic,
        }
    }
}

/// Parses markdown text into blocks.
pub fn transform(text: &str) -> Vec<RenderedBlock> {
    block::parse_blocks(text)
}

/// `(language, source)` of every diagram block, including ones nested in quotes.
pub fn diagram_sources(blocks: &[RenderedBlock]) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    collect_diagram_sources(blocks, &mut out);
    out
}

fn collect_diagram_sources<'a>(blocks: &'a [RenderedBlock], out: &mut Vec<(&'a str, &'a str)>) {
    for block in blocks {
        match block {
            RenderedBlock::Diagram { language, source } => out.push((language, source)),
            RenderedBlock::BlockQuote(inner) => collect_diagram_sources(inner, out),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/markdown/mod.rs"]
mod tests;
