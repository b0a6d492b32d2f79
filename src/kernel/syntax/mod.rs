//! Code-block highlighting with tree-sitter.
//!
//! Every byte is painted by the innermost classified node that covers it;
//! children of leaf kinds (comments, strings, ...) are not visited. The paint
//! is then cut into per-line spans.

mod keywords;
mod language;

pub use language::LanguageId;

use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Comment,
    String,
    Keyword,
    Type,
    Number,
    Constant,
    Function,
    Macro,
    Attribute,
    Property,
    Tag,
}

impl HighlightKind {
    /// Tree traversal skips the children of a node classified as a leaf kind.
    pub const fn is_leaf(self) -> bool {
        matches!(
            self,
            Self::Comment | Self::String | Self::Attribute | Self::Property
        )
    }
}

/// Byte range within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub kind: HighlightKind,
}

/// Highlights a snippet. Returns one span list per `\n`-separated line with
/// offsets relative to the line start. A parser failure yields empty lists,
/// never an error.
pub fn highlight_snippet(language: LanguageId, text: &str) -> Vec<Vec<HighlightSpan>> {
    let line_ranges = line_ranges(text);
    let empty = || vec![Vec::new(); line_ranges.len()];

    let mut parser = Parser::new();
    if parser.set_language(language.grammar()).is_err() {
        tracing::warn!(language = language.display_name(), "grammar rejected by parser");
        return empty();
    }
    let Some(tree) = parser.parse(text, None) else {
        return empty();
    };

    let paint = paint_bytes(language, tree.root_node(), text.len());
    line_ranges
        .into_iter()
        .map(|(start, end)| spans_for_range(&paint, start, end))
        .collect()
}

/// `(start, end)` byte ranges of each line, line terminators excluded.
fn line_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            let end = if i > start && text.as_bytes()[i - 1] == b'\r' {
                i - 1
            } else {
                i
            };
            out.push((start, end));
            start = i + 1;
        }
    }
    out.push((start, text.len()));
    out
}

fn paint_bytes(language: LanguageId, root: Node<'_>, len: usize) -> Vec<Option<HighlightKind>> {
    let mut paint = vec![None; len];
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let start = node.start_byte().min(len);
        let end = node.end_byte().min(len);
        if start >= end {
            continue;
        }

        if let Some(kind) = classify_node(language, node) {
            paint[start..end].fill(Some(kind));
            if kind.is_leaf() {
                continue;
            }
        }

        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
    paint
}

fn spans_for_range(paint: &[Option<HighlightKind>], start: usize, end: usize) -> Vec<HighlightSpan> {
    let mut spans: Vec<HighlightSpan> = Vec::new();
    for (offset, kind) in paint[start..end].iter().enumerate() {
        let Some(kind) = *kind else {
            continue;
        };
        match spans.last_mut() {
            Some(last) if last.kind == kind && last.end == offset => last.end = offset + 1,
            _ => spans.push(HighlightSpan {
                start: offset,
                end: offset + 1,
                kind,
            }),
        }
    }
    spans
}

fn node_is_field(parent: Node<'_>, field_name: &str, node: Node<'_>) -> bool {
    parent
        .child_by_field_name(field_name)
        .is_some_and(|field| same_node(field, node))
}

fn same_node(left: Node<'_>, right: Node<'_>) -> bool {
    left.start_byte() == right.start_byte() && left.end_byte() == right.end_byte()
}

fn classify_node(language: LanguageId, node: Node<'_>) -> Option<HighlightKind> {
    let kind = node.kind();

    if kind.contains("comment") {
        return Some(HighlightKind::Comment);
    }
    if let Some(kind) = classify_key(language, node) {
        return Some(kind);
    }
    if kind.contains("string")
        || matches!(
            kind,
            "char_literal"
                | "byte_literal"
                | "character_literal"
                | "raw_string_literal"
                | "template_string"
                | "attribute_value"
                | "quoted_attribute_value"
                | "heredoc_body"
        )
    {
        return Some(HighlightKind::String);
    }
    if kind.contains("integer")
        || kind.contains("float")
        || kind.contains("number")
        || kind == "color_value"
        || (kind.ends_with("_literal") && (kind.contains("int") || kind.contains("imaginary")))
    {
        return Some(HighlightKind::Number);
    }
    if matches!(
        kind,
        "type_identifier"
            | "primitive_type"
            | "predefined_type"
            | "integral_type"
            | "floating_point_type"
            | "void_type"
            | "boolean_type"
            | "sized_type_specifier"
    ) {
        return Some(HighlightKind::Type);
    }
    if matches!(
        kind,
        "attribute_item"
            | "inner_attribute_item"
            | "decorator"
            | "annotation"
            | "marker_annotation"
            | "attribute_name"
    ) {
        return Some(HighlightKind::Attribute);
    }
    if matches!(
        kind,
        "boolean_literal"
            | "true"
            | "false"
            | "null"
            | "null_literal"
            | "nil"
            | "none"
            | "undefined"
            | "boolean"
    ) && node.is_named()
    {
        return Some(HighlightKind::Constant);
    }
    if matches!(kind, "tag_name" | "class_name" | "id_name") {
        return Some(HighlightKind::Tag);
    }
    if matches!(kind, "property_name" | "field_identifier" | "property_identifier") {
        return Some(call_target(node).unwrap_or(HighlightKind::Property));
    }
    if matches!(kind, "command_name" | "function_name") {
        return Some(HighlightKind::Function);
    }
    if matches!(kind, "identifier" | "name") {
        if let Some(kind) = classify_identifier(node) {
            return Some(kind);
        }
    }
    if !node.is_named() && keywords::is_keyword(language, kind) {
        return Some(HighlightKind::Keyword);
    }
    None
}

/// Mapping keys in data languages.
fn classify_key(language: LanguageId, node: Node<'_>) -> Option<HighlightKind> {
    let parent = node.parent()?;
    match language {
        LanguageId::Json if parent.kind() == "pair" && node_is_field(parent, "key", node) => {
            Some(HighlightKind::Property)
        }
        LanguageId::Yaml
            if matches!(parent.kind(), "block_mapping_pair" | "flow_pair")
                && node_is_field(parent, "key", node) =>
        {
            Some(HighlightKind::Property)
        }
        LanguageId::Toml if matches!(node.kind(), "bare_key" | "quoted_key" | "dotted_key") => {
            Some(HighlightKind::Property)
        }
        _ => None,
    }
}

fn classify_identifier(node: Node<'_>) -> Option<HighlightKind> {
    let parent = node.parent()?;
    match parent.kind() {
        "function_item"
        | "function_signature_item"
        | "function_declaration"
        | "function_definition"
        | "method_declaration"
        | "method_definition"
        | "generator_function_declaration"
            if node_is_field(parent, "name", node) =>
        {
            Some(HighlightKind::Function)
        }
        "function_declarator" if node_is_field(parent, "declarator", node) => {
            Some(HighlightKind::Function)
        }
        "macro_invocation" if node_is_field(parent, "macro", node) => Some(HighlightKind::Macro),
        "const_item" | "static_item" if node_is_field(parent, "name", node) => {
            Some(HighlightKind::Constant)
        }
        _ => call_target(node),
    }
}

/// `Function` when `node` is the callee of a call expression.
fn call_target(node: Node<'_>) -> Option<HighlightKind> {
    let parent = node.parent()?;
    match parent.kind() {
        "call_expression" | "call" if node_is_field(parent, "function", node) => {
            Some(HighlightKind::Function)
        }
        "method_invocation" if node_is_field(parent, "name", node) => {
            Some(HighlightKind::Function)
        }
        "field_expression" | "member_expression" | "attribute" | "selector_expression" => {
            let grand = parent.parent()?;
            let is_callee = matches!(grand.kind(), "call_expression" | "call")
                && node_is_field(grand, "function", parent);
            is_callee.then_some(HighlightKind::Function)
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/syntax.rs"]
mod tests;
