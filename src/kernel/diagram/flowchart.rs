//! `graph` / `flowchart` dialect: statements → nodes and edges.

use rustc_hash::FxHashMap;

use super::{is_comment, statements, DiagramError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl Direction {
    fn parse(token: &str) -> Option<Self> {
        Some(match token.to_ascii_uppercase().as_str() {
            "TD" | "TB" => Direction::TopDown,
            "BT" => Direction::BottomUp,
            "LR" => Direction::LeftRight,
            "RL" => Direction::RightLeft,
            _ => return None,
        })
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopDown | Direction::BottomUp)
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::BottomUp | Direction::RightLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Rect,
    Round,
    Circle,
    Diamond,
    Flag,
    Cylinder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Solid,
    Dotted,
    Thick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
    pub style: EdgeStyle,
    pub arrow: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

const IGNORED_KEYWORDS: &[&str] = &[
    "subgraph",
    "end",
    "classDef",
    "class",
    "style",
    "click",
    "linkStyle",
    "direction",
];

/// Returns the direction when `line` is a `graph` / `flowchart` header.
pub(super) fn header_direction(line: &str) -> Option<Result<Direction, String>> {
    let mut words = line.split_whitespace();
    let keyword = words.next()?;
    if keyword != "graph" && keyword != "flowchart" {
        return None;
    }
    Some(match words.next() {
        None => Ok(Direction::TopDown),
        Some(token) => {
            let token = token.trim_end_matches(';');
            Direction::parse(token).ok_or_else(|| format!("unknown direction `{token}`"))
        }
    })
}

/// Parses a flowchart. When `require_header` is false a missing header means
/// top-down.
pub fn parse(source: &str, require_header: bool) -> Result<Flowchart, DiagramError> {
    let mut builder = Builder::default();
    let mut direction = None;

    for (line_no, line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }
        if direction.is_none() {
            match header_direction(trimmed) {
                Some(Ok(dir)) => {
                    direction = Some(dir);
                    continue;
                }
                Some(Err(message)) => return Err(DiagramError::new(line_no, message)),
                None if require_header => {
                    return Err(DiagramError::new(
                        line_no,
                        "expected `graph` or `flowchart` header",
                    ))
                }
                None => direction = Some(Direction::TopDown),
            }
        }

        for statement in statements(trimmed) {
            let first = statement.split_whitespace().next().unwrap_or_default();
            if IGNORED_KEYWORDS.contains(&first) {
                continue;
            }
            builder
                .statement(statement)
                .map_err(|message| DiagramError::new(line_no, message))?;
        }
    }

    if builder.nodes.is_empty() {
        return Err(DiagramError::new(0, "flowchart has no nodes"));
    }
    Ok(Flowchart {
        direction: direction.unwrap_or(Direction::TopDown),
        nodes: builder.nodes,
        edges: builder.edges,
    })
}

#[derive(Default)]
struct Builder {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    by_id: FxHashMap<String, usize>,
}

struct EdgeOp {
    style: EdgeStyle,
    arrow: bool,
    label: Option<String>,
}

impl Builder {
    fn statement(&mut self, src: &str) -> Result<(), String> {
        let mut cursor = Cursor { src, pos: 0 };
        let mut previous = self.node_group(&mut cursor)?;

        loop {
            cursor.skip_ws();
            if cursor.at_end() {
                return Ok(());
            }
            let Some(op) = cursor.edge_op()? else {
                return Err(format!("unexpected `{}`", cursor.rest()));
            };
            cursor.skip_ws();
            if cursor.at_end() {
                return Err("edge has no target node".to_string());
            }
            let targets = self.node_group(&mut cursor)?;
            for &from in &previous {
                for &to in &targets {
                    self.edges.push(FlowEdge {
                        from,
                        to,
                        label: op.label.clone(),
                        style: op.style,
                        arrow: op.arrow,
                    });
                }
            }
            previous = targets;
        }
    }

    fn node_group(&mut self, cursor: &mut Cursor<'_>) -> Result<Vec<usize>, String> {
        let mut group = vec![self.node(cursor)?];
        loop {
            let save = cursor.pos;
            cursor.skip_ws();
            if cursor.eat("&") {
                cursor.skip_ws();
                group.push(self.node(cursor)?);
            } else {
                cursor.pos = save;
                return Ok(group);
            }
        }
    }

    fn node(&mut self, cursor: &mut Cursor<'_>) -> Result<usize, String> {
        cursor.skip_ws();
        let id = cursor.ident();
        if id.is_empty() {
            return Err(match cursor.rest().chars().next() {
                Some(ch) => format!("expected node id, found `{ch}`"),
                None => "expected node id".to_string(),
            });
        }
        let shape = cursor.shape()?;
        Ok(self.intern(id, shape))
    }

    fn intern(&mut self, id: &str, shape: Option<(NodeShape, String)>) -> usize {
        if let Some(&idx) = self.by_id.get(id) {
            if let Some((shape, label)) = shape {
                let node = &mut self.nodes[idx];
                node.shape = shape;
                node.label = label;
            }
            return idx;
        }
        let (shape, label) = shape.unwrap_or_else(|| (NodeShape::Rect, id.to_string()));
        let idx = self.nodes.len();
        self.nodes.push(FlowNode {
            id: id.to_string(),
            label,
            shape,
        });
        self.by_id.insert(id.to_string(), idx);
        idx
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

/// Opening delimiter, closing delimiter, shape. Longer openers first.
const SHAPES: &[(&str, &str, NodeShape)] = &[
    ("((", "))", NodeShape::Circle),
    ("([", "])", NodeShape::Round),
    ("[(", ")]", NodeShape::Cylinder),
    ("[[", "]]", NodeShape::Rect),
    ("{{", "}}", NodeShape::Diamond),
    ("[", "]", NodeShape::Rect),
    ("(", ")", NodeShape::Round),
    ("{", "}", NodeShape::Diamond),
    (">", "]", NodeShape::Flag),
];

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, ch)| !(ch.is_alphanumeric() || ch == '_'))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    fn shape(&mut self) -> Result<Option<(NodeShape, String)>, String> {
        let rest = self.rest();
        for &(open, close, shape) in SHAPES {
            if !rest.starts_with(open) {
                continue;
            }
            let body = &rest[open.len()..];
            let Some(end) = find_outside_quotes(body, close) else {
                return Err(format!("unclosed node label, expected `{close}`"));
            };
            self.pos += open.len() + end + close.len();
            return Ok(Some((shape, clean_label(&body[..end]))));
        }
        Ok(None)
    }

    fn edge_op(&mut self) -> Result<Option<EdgeOp>, String> {
        let rest = self.rest();

        // `-- text -->`, `== text ==>`, `-. text .->`
        const TEXT_FORMS: &[(&str, &[(&str, EdgeStyle, bool)])] = &[
            (
                "--",
                &[("-->", EdgeStyle::Solid, true), ("---", EdgeStyle::Solid, false)],
            ),
            (
                "==",
                &[("==>", EdgeStyle::Thick, true), ("===", EdgeStyle::Thick, false)],
            ),
            (
                "-.",
                &[(".->", EdgeStyle::Dotted, true), (".-", EdgeStyle::Dotted, false)],
            ),
        ];
        for &(open, closers) in TEXT_FORMS {
            let Some(after) = rest.strip_prefix(open) else {
                continue;
            };
            if !after.starts_with(char::is_whitespace) {
                continue;
            }
            let found = closers
                .iter()
                .filter_map(|&(close, style, arrow)| {
                    after.find(close).map(|at| (at, close, style, arrow))
                })
                .min_by_key(|&(at, ..)| at);
            let Some((at, close, style, arrow)) = found else {
                return Err("unterminated edge label".to_string());
            };
            let label = after[..at].trim();
            self.pos += open.len() + at + close.len();
            return Ok(Some(EdgeOp {
                style,
                arrow,
                label: (!label.is_empty()).then(|| label.to_string()),
            }));
        }

        let Some((len, style, arrow)) = plain_edge(rest) else {
            return Ok(None);
        };
        self.pos += len;

        let save = self.pos;
        self.skip_ws();
        let mut label = None;
        if self.eat("|") {
            let body = self.rest();
            let Some(end) = body.find('|') else {
                return Err("unterminated edge label".to_string());
            };
            let text = clean_label(&body[..end]);
            if !text.is_empty() {
                label = Some(text);
            }
            self.pos += end + 1;
        } else {
            self.pos = save;
        }
        Ok(Some(EdgeOp {
            style,
            arrow,
            label,
        }))
    }
}

/// Matches `-->`, `--->`, `---`, `-.->`, `-..-`, `==>`, `===` at the start of `rest`.
fn plain_edge(rest: &str) -> Option<(usize, EdgeStyle, bool)> {
    let bytes = rest.as_bytes();
    let run = |from: usize, byte: u8| bytes[from..].iter().take_while(|&&b| b == byte).count();

    if rest.starts_with("-.") {
        let dots = run(1, b'.');
        let mut len = 1 + dots;
        if bytes.get(len) != Some(&b'-') {
            return None;
        }
        len += 1;
        let arrow = bytes.get(len) == Some(&b'>');
        if arrow {
            len += 1;
        }
        return Some((len, EdgeStyle::Dotted, arrow));
    }

    for (byte, style) in [(b'-', EdgeStyle::Solid), (b'=', EdgeStyle::Thick)] {
        let n = run(0, byte);
        if n >= 2 && bytes.get(n) == Some(&b'>') {
            return Some((n + 1, style, true));
        }
        if n >= 3 {
            return Some((n, style, false));
        }
    }
    None
}

fn find_outside_quotes(body: &str, close: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, ch) in body.char_indices() {
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if !in_quotes && body[i..].starts_with(close) {
            return Some(i);
        }
    }
    None
}

fn clean_label(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.replace("<br>", " ").replace("<br/>", " ")
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/diagram/flowchart.rs"]
mod tests;
