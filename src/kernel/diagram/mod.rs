//! Diagram renderer: a mermaid subset drawn as Unicode box art.
//!
//! `render` is pure. `render_isolated` additionally contains panics so a
//! broken diagram can only ever affect its own block. `DiagramCache` tracks
//! per-source results for the presentation layer while jobs run elsewhere.

mod canvas;
pub mod flowchart;
mod layout;
pub mod sequence;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use uuid::Uuid;

use crate::kernel::markdown::{diagram_sources, RenderedBlock};

const DIAGRAM_LANGUAGES: &[&str] = &["mermaid", "flowchart", "sequence", "sequencediagram"];

/// Fence tags routed to the diagram renderer.
pub fn is_diagram_language(tag: &str) -> bool {
    DIAGRAM_LANGUAGES
        .iter()
        .any(|lang| lang.eq_ignore_ascii_case(tag))
}

/// Unique per render, so concurrent renders of one page never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramId(Uuid);

impl DiagramId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DiagramId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagram-{}", self.0.simple())
    }
}

/// A syntax or render failure. `line` is 1-based; 0 means the whole diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramError {
    pub line: usize,
    pub message: String,
}

impl DiagramError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.message)
        } else {
            write!(f, "line {}: {}", self.line, self.message)
        }
    }
}

impl std::error::Error for DiagramError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramRender {
    pub id: DiagramId,
    pub result: Result<Vec<String>, DiagramError>,
}

pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with("%%")
}

/// Splits a line on `;` outside brackets and quotes.
pub(crate) fn statements(line: &str) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '[' | '(' | '{' if !in_quotes => depth += 1,
            ']' | ')' | '}' if !in_quotes => depth = depth.saturating_sub(1),
            ';' if !in_quotes && depth == 0 => {
                parts.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&line[start..]);
    parts.into_iter().map(str::trim).filter(|s| !s.is_empty())
}

/// Renders `source` for a fence tagged `language`.
///
/// An explicit `graph` / `flowchart` / `sequenceDiagram` header picks the
/// dialect. Without one, the `flowchart` and `sequence` tags imply their
/// dialect while `mermaid` requires the header.
pub fn render(language: &str, source: &str) -> Result<Vec<String>, DiagramError> {
    let Some((line_no, first)) = source
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .find(|(_, l)| !l.is_empty() && !is_comment(l))
    else {
        return Err(DiagramError::new(0, "diagram is empty"));
    };

    if sequence::is_header(first) {
        return sequence::parse(source, true).map(|d| sequence::render(&d));
    }
    if flowchart::header_direction(first).is_some() {
        return flowchart::parse(source, true).map(|c| layout::render(&c));
    }

    let language = language.to_ascii_lowercase();
    match language.as_str() {
        "sequence" | "sequencediagram" => {
            sequence::parse(source, false).map(|d| sequence::render(&d))
        }
        "flowchart" => flowchart::parse(source, false).map(|c| layout::render(&c)),
        _ => {
            let kind = first.split_whitespace().next().unwrap_or(first);
            Err(DiagramError::new(
                line_no,
                format!("unsupported diagram type `{kind}`"),
            ))
        }
    }
}

/// Renders with a fresh id; a panic becomes a `DiagramError` instead of unwinding.
pub fn render_isolated(language: &str, source: &str) -> DiagramRender {
    let id = DiagramId::new();
    let result = match panic::catch_unwind(AssertUnwindSafe(|| render(language, source))) {
        Ok(result) => result,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            tracing::error!(%id, %detail, "diagram renderer panicked");
            Err(DiagramError::new(0, format!("renderer crashed: {detail}")))
        }
    };
    DiagramRender { id, result }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramKey(u64);

impl DiagramKey {
    pub fn of(language: &str, source: &str) -> Self {
        let mut hasher = FxHasher::default();
        language.to_ascii_lowercase().hash(&mut hasher);
        source.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Work item for rendering one diagram off the UI thread.
#[derive(Debug, Clone)]
pub struct DiagramJob {
    pub key: DiagramKey,
    pub language: String,
    pub source: String,
}

impl DiagramJob {
    pub fn run(&self) -> DiagramRender {
        render_isolated(&self.language, &self.source)
    }
}

#[derive(Debug, Clone)]
pub enum DiagramSlot {
    Pending,
    Ready(Arc<DiagramRender>),
}

/// Render results keyed by diagram source; a changed source is a new key and
/// therefore a full re-render.
#[derive(Debug, Default)]
pub struct DiagramCache {
    slots: FxHashMap<DiagramKey, DiagramSlot>,
    revision: u64,
}

impl DiagramCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str, source: &str) -> Option<&DiagramSlot> {
        self.slots.get(&DiagramKey::of(language, source))
    }

    /// Bumped whenever a result lands; part of the presentation cache key.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Marks a source pending and returns its job, or `None` when it is
    /// already pending or rendered.
    pub fn request(&mut self, language: &str, source: &str) -> Option<DiagramJob> {
        let key = DiagramKey::of(language, source);
        if self.slots.contains_key(&key) {
            return None;
        }
        self.slots.insert(key, DiagramSlot::Pending);
        Some(DiagramJob {
            key,
            language: language.to_string(),
            source: source.to_string(),
        })
    }

    /// Jobs for every diagram in `blocks` not yet pending or rendered.
    pub fn request_all(&mut self, blocks: &[RenderedBlock]) -> Vec<DiagramJob> {
        diagram_sources(blocks)
            .into_iter()
            .filter_map(|(language, source)| self.request(language, source))
            .collect()
    }

    /// Stores a finished render. Results for keys no longer tracked are dropped.
    pub fn complete(&mut self, key: DiagramKey, render: DiagramRender) -> bool {
        match self.slots.get_mut(&key) {
            Some(slot) if matches!(slot, DiagramSlot::Pending) => {
                if let Err(err) = &render.result {
                    tracing::debug!(id = %render.id, error = %err, "diagram render failed");
                }
                *slot = DiagramSlot::Ready(Arc::new(render));
                self.revision += 1;
                true
            }
            _ => false,
        }
    }

    /// Drops entries for diagrams no longer present in `blocks`.
    pub fn retain_blocks(&mut self, blocks: &[RenderedBlock]) {
        let live: FxHashSet<DiagramKey> = diagram_sources(blocks)
            .into_iter()
            .map(|(language, source)| DiagramKey::of(language, source))
            .collect();
        let before = self.slots.len();
        self.slots.retain(|key, _| live.contains(key));
        if self.slots.len() != before {
            self.revision += 1;
        }
    }

    /// Synchronous path: renders every missing diagram on the calling thread.
    pub fn render_all_now(&mut self, blocks: &[RenderedBlock]) {
        for job in self.request_all(blocks) {
            let render = job.run();
            self.complete(job.key, render);
        }
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/diagram/mod.rs"]
mod tests;
