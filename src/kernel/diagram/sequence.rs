//! `sequenceDiagram` dialect: participants, messages, notes, blocks.

use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashMap;

use crate::core::text_window::display_width;

use super::canvas::{Canvas, LineStyle};
use super::{is_comment, DiagramError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub label: String,
    pub actor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowHead {
    Filled,
    Open,
    Cross,
    Async,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: usize,
    pub to: usize,
    pub text: String,
    pub dotted: bool,
    pub head: ArrowHead,
    pub number: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotePlacement {
    LeftOf(usize),
    RightOf(usize),
    Over(usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Message(Message),
    Note {
        placement: NotePlacement,
        text: String,
    },
    /// `loop`, `alt`, `else`, `opt`, `par`, `end`, ... drawn as a separator.
    Block { keyword: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDiagram {
    pub participants: Vec<Participant>,
    pub events: Vec<Event>,
}

const BLOCK_KEYWORDS: &[&str] = &[
    "loop", "alt", "else", "opt", "par", "and", "critical", "break", "rect", "end",
];

fn message_re() -> Result<&'static Regex, String> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<from>[^\s\-+>:]+)\s*(?P<arrow>-->>|->>|--x|-x|--\)|-\)|-->|->)\s*[+-]?\s*(?P<to>[^\s:]+)\s*(?::(?P<text>.*))?$",
        )
    })
    .as_ref()
    .map_err(|e| e.to_string())
}

fn note_re() -> Result<&'static Regex, String> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^note\s+(?P<place>left of|right of|over)\s+(?P<who>[^:]+?)\s*:(?P<text>.*)$",
        )
    })
    .as_ref()
    .map_err(|e| e.to_string())
}

pub(super) fn is_header(line: &str) -> bool {
    line.split_whitespace().next() == Some("sequenceDiagram")
}

pub fn parse(source: &str, require_header: bool) -> Result<SequenceDiagram, DiagramError> {
    let mut parser = Parser::default();
    let mut seen_header = false;

    for (line_no, line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim().trim_end_matches(';');
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }
        if !seen_header {
            seen_header = true;
            if is_header(trimmed) {
                continue;
            }
            if require_header {
                return Err(DiagramError::new(
                    line_no,
                    "expected `sequenceDiagram` header",
                ));
            }
        }
        parser
            .line(trimmed)
            .map_err(|message| DiagramError::new(line_no, message))?;
    }

    if parser.participants.is_empty() {
        return Err(DiagramError::new(0, "sequence diagram has no participants"));
    }
    Ok(SequenceDiagram {
        participants: parser.participants,
        events: parser.events,
    })
}

#[derive(Default)]
struct Parser {
    participants: Vec<Participant>,
    by_id: FxHashMap<String, usize>,
    events: Vec<Event>,
    autonumber: Option<usize>,
}

impl Parser {
    fn participant(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.by_id.get(id) {
            return idx;
        }
        let idx = self.participants.len();
        self.participants.push(Participant {
            id: id.to_string(),
            label: id.to_string(),
            actor: false,
        });
        self.by_id.insert(id.to_string(), idx);
        idx
    }

    fn line(&mut self, line: &str) -> Result<(), String> {
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword {
            "participant" | "actor" => {
                if rest.is_empty() {
                    return Err(format!("`{keyword}` needs a name"));
                }
                let (id, label) = match rest.split_once(" as ") {
                    Some((id, label)) => (id.trim(), Some(label.trim())),
                    None => (rest, None),
                };
                let idx = self.participant(id);
                let p = &mut self.participants[idx];
                p.actor = keyword == "actor";
                if let Some(label) = label.filter(|l| !l.is_empty()) {
                    p.label = label.to_string();
                }
                return Ok(());
            }
            "autonumber" => {
                self.autonumber = Some(rest.parse().unwrap_or(1));
                return Ok(());
            }
            "activate" | "deactivate" => {
                if rest.is_empty() {
                    return Err(format!("`{keyword}` needs a participant"));
                }
                self.participant(rest);
                return Ok(());
            }
            "title" => return Ok(()),
            k if BLOCK_KEYWORDS.contains(&k) => {
                self.events.push(Event::Block {
                    keyword: k.to_string(),
                    label: rest.to_string(),
                });
                return Ok(());
            }
            _ => {}
        }

        if let Some(caps) = note_re()?.captures(line) {
            let place = caps["place"].to_ascii_lowercase();
            let who: Vec<&str> = caps["who"].split(',').map(str::trim).collect();
            let text = caps["text"].trim().to_string();
            let placement = match (place.as_str(), who.as_slice()) {
                ("left of", [p]) => NotePlacement::LeftOf(self.participant(p)),
                ("right of", [p]) => NotePlacement::RightOf(self.participant(p)),
                ("over", [p]) => {
                    let idx = self.participant(p);
                    NotePlacement::Over(idx, idx)
                }
                ("over", [a, b]) => {
                    NotePlacement::Over(self.participant(a), self.participant(b))
                }
                _ => return Err(format!("invalid note target `{}`", &caps["who"])),
            };
            self.events.push(Event::Note { placement, text });
            return Ok(());
        }

        if let Some(caps) = message_re()?.captures(line) {
            let from = self.participant(&caps["from"]);
            let to = self.participant(&caps["to"]);
            let arrow = &caps["arrow"];
            let head = match arrow.trim_start_matches('-') {
                ">>" => ArrowHead::Filled,
                ">" => ArrowHead::Open,
                "x" => ArrowHead::Cross,
                _ => ArrowHead::Async,
            };
            let number = self.autonumber;
            if let Some(n) = number {
                self.autonumber = Some(n + 1);
            }
            self.events.push(Event::Message(Message {
                from,
                to,
                text: caps
                    .name("text")
                    .map_or("", |m| m.as_str())
                    .trim()
                    .to_string(),
                dotted: arrow.starts_with("--"),
                head,
                number,
            }));
            return Ok(());
        }

        Err(format!("unrecognised statement `{line}`"))
    }
}

const HEADER_HEIGHT: usize = 3;

fn message_text(msg: &Message) -> String {
    match msg.number {
        Some(n) if msg.text.is_empty() => format!("{n}."),
        Some(n) => format!("{n}. {}", msg.text),
        None => msg.text.clone(),
    }
}

fn note_width(text: &str) -> usize {
    display_width(text) + 4
}

/// Lifeline x positions wide enough for every box, message, and note.
fn lifeline_centers(diagram: &SequenceDiagram) -> Vec<usize> {
    let widths: Vec<usize> = diagram
        .participants
        .iter()
        .map(|p| display_width(&p.label) + 4)
        .collect();
    let n = widths.len();

    // gaps[i] = distance between centers i and i + 1.
    let mut gaps: Vec<usize> = (1..n)
        .map(|i| (widths[i - 1] - widths[i - 1] / 2) + widths[i] / 2 + 2)
        .collect();

    let mut spans: Vec<(usize, usize, usize)> = Vec::new();
    for event in &diagram.events {
        match event {
            Event::Message(msg) if msg.from != msg.to => {
                let (lo, hi) = (msg.from.min(msg.to), msg.from.max(msg.to));
                spans.push((lo, hi, display_width(&message_text(msg)) + 4));
            }
            Event::Message(msg) if msg.from + 1 < n => {
                spans.push((msg.from, msg.from + 1, display_width(&message_text(msg)) + 6));
            }
            Event::Note {
                placement: NotePlacement::RightOf(p),
                text,
            } if p + 1 < n => {
                spans.push((*p, p + 1, note_width(text) + 3));
            }
            Event::Note {
                placement: NotePlacement::LeftOf(p),
                text,
            } if *p > 0 => {
                spans.push((p - 1, *p, note_width(text) + 3));
            }
            _ => {}
        }
    }
    spans.sort_by_key(|&(lo, hi, _)| hi - lo);
    for (lo, hi, need) in spans {
        let have: usize = gaps[lo..hi].iter().sum();
        if have < need {
            gaps[hi - 1] += need - have;
        }
    }

    let mut centers = Vec::with_capacity(n);
    let mut x = widths.first().map_or(0, |w| w / 2);
    for i in 0..n {
        centers.push(x);
        if let Some(gap) = gaps.get(i) {
            x += gap;
        }
    }

    // Room on the left for the first box and any note placed left of a lifeline.
    let mut margin = 0usize;
    for event in &diagram.events {
        if let Event::Note { placement, text } = event {
            let (x0, _) = note_span(*placement, text, &centers);
            if x0 < 0 {
                margin = margin.max(x0.unsigned_abs());
            }
        }
    }
    centers.iter().map(|c| c + margin).collect()
}

/// Horizontal extent of a note as (left, width); left may be negative before margins.
fn note_span(placement: NotePlacement, text: &str, centers: &[usize]) -> (isize, usize) {
    let width = note_width(text);
    match placement {
        NotePlacement::LeftOf(p) => (centers[p] as isize - 1 - width as isize, width),
        NotePlacement::RightOf(p) => (centers[p] as isize + 2, width),
        NotePlacement::Over(a, b) => {
            let (lo, hi) = (centers[a.min(b)], centers[a.max(b)]);
            let width = width.max(hi - lo + 5);
            let mid = (lo + hi) / 2;
            (mid as isize - (width / 2) as isize, width)
        }
    }
}

fn event_height(event: &Event) -> usize {
    match event {
        Event::Message(msg) if msg.from == msg.to => 3,
        Event::Message(msg) if message_text(msg).is_empty() => 1,
        Event::Message(_) => 2,
        Event::Note { .. } => 3,
        Event::Block { .. } => 1,
    }
}

fn draw_participant(canvas: &mut Canvas, p: &Participant, center: usize, y: usize) {
    let width = display_width(&p.label) + 4;
    let x = center - width / 2;
    canvas.draw_box(x, y, width, HEADER_HEIGHT);
    if p.actor {
        let right = x + width - 1;
        canvas.glyph(x, y, '╭');
        canvas.glyph(right, y, '╮');
        canvas.glyph(x, y + 2, '╰');
        canvas.glyph(right, y + 2, '╯');
    }
    canvas.text(x + 2, y + 1, &p.label);
}

pub fn render(diagram: &SequenceDiagram) -> Vec<String> {
    let centers = lifeline_centers(diagram);
    let body_top = HEADER_HEIGHT;
    let body_height: usize = diagram.events.iter().map(event_height).sum();
    let footer_top = body_top + body_height + 1;
    let right_edge = diagram
        .participants
        .iter()
        .zip(&centers)
        .map(|(p, c)| c + display_width(&p.label) + 4)
        .max()
        .unwrap_or(0);

    let mut canvas = Canvas::new();
    for &center in &centers {
        canvas.vline(center, HEADER_HEIGHT - 1, footer_top, LineStyle::Light);
    }

    let mut y = body_top;
    for event in &diagram.events {
        match event {
            Event::Message(msg) => draw_message(&mut canvas, msg, &centers, y),
            Event::Note { placement, text } => {
                let (x, width) = note_span(*placement, text, &centers);
                let x = x.max(0) as usize;
                canvas.clear(x, y, width, 3);
                canvas.draw_box(x, y, width, 3);
                canvas.text(x + 2, y + 1, text);
            }
            Event::Block { keyword, label } => {
                canvas.hline(y, 0, right_edge, LineStyle::Dotted);
                let caption = if label.is_empty() {
                    format!(" {keyword} ")
                } else {
                    format!(" {keyword} {label} ")
                };
                canvas.text(1, y, &caption);
            }
        }
        y += event_height(event);
    }

    for (p, &center) in diagram.participants.iter().zip(&centers) {
        draw_participant(&mut canvas, p, center, 0);
        draw_participant(&mut canvas, p, center, footer_top);
    }
    canvas.into_lines()
}

fn draw_message(canvas: &mut Canvas, msg: &Message, centers: &[usize], y: usize) {
    let style = if msg.dotted {
        LineStyle::Dotted
    } else {
        LineStyle::Light
    };
    let text = message_text(msg);
    let from = centers[msg.from];
    let to = centers[msg.to];

    if msg.from == msg.to {
        canvas.hline(y, from, from + 3, style);
        canvas.vline(from + 3, y, y + 2, style);
        canvas.hline(y + 2, from, from + 3, style);
        if msg.head != ArrowHead::Open {
            canvas.glyph(from + 1, y + 2, head_glyph(msg.head, false));
        }
        canvas.text(from + 5, y + 1, &text);
        return;
    }

    let mut row = y;
    if !text.is_empty() {
        let (lo, hi) = (from.min(to), from.max(to));
        let width = display_width(&text);
        let x = ((lo + hi) / 2).saturating_sub(width / 2).max(lo + 2);
        canvas.text(x, row, &text);
        row += 1;
    }

    let rightward = to > from;
    match msg.head {
        ArrowHead::Open => canvas.hline(row, from, to, style),
        head => {
            let tip = if rightward { to - 1 } else { to + 1 };
            canvas.hline(row, from, tip, style);
            canvas.glyph(tip, row, head_glyph(head, rightward));
        }
    }
}

fn head_glyph(head: ArrowHead, rightward: bool) -> char {
    match (head, rightward) {
        (ArrowHead::Filled, true) => '▶',
        (ArrowHead::Filled, false) => '◀',
        (ArrowHead::Async, true) => '▷',
        (ArrowHead::Async, false) => '◁',
        (ArrowHead::Cross, _) => '×',
        (ArrowHead::Open, _) => '─',
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/diagram/sequence.rs"]
mod tests;
