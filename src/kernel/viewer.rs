//! Document viewer state machine.
//!
//! Only the result of the most recent request is applied; anything else is
//! dropped on arrival. A transient store failure tries the static copy once
//! (when configured) before settling on an error.

use crate::kernel::effect::{Effect, RequestId};
use crate::kernel::markdown::{self, RenderedBlock};
use crate::kernel::services::ports::StoreError;
use crate::models::DocPath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState {
    Idle,
    Loading,
    Loaded(String),
    NotFound,
    Error(String),
}

impl DocumentState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DocumentState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Primary,
    Static,
}

#[derive(Debug)]
pub struct DocumentViewer {
    path: Option<DocPath>,
    state: DocumentState,
    blocks: Vec<RenderedBlock>,
    active: Option<(RequestId, Stage)>,
    static_fallback: bool,
}

impl DocumentViewer {
    pub fn new(static_fallback: bool) -> Self {
        Self {
            path: None,
            state: DocumentState::Idle,
            blocks: Vec::new(),
            active: None,
            static_fallback,
        }
    }

    pub fn path(&self) -> Option<&DocPath> {
        self.path.as_ref()
    }

    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Transformed content; empty unless `Loaded`.
    pub fn blocks(&self) -> &[RenderedBlock] {
        &self.blocks
    }

    pub fn content(&self) -> Option<&str> {
        match &self.state {
            DocumentState::Loaded(text) => Some(text),
            _ => None,
        }
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active.map(|(request, _)| request)
    }

    /// Edit mode is offered only for a loaded document.
    pub fn can_edit(&self) -> bool {
        self.path.is_some() && matches!(self.state, DocumentState::Loaded(_))
    }

    pub fn can_retry(&self) -> bool {
        self.path.is_some() && matches!(self.state, DocumentState::Error(_))
    }

    /// Starts loading `path`, superseding any request still in flight.
    pub fn navigate(&mut self, path: DocPath) -> Effect {
        let request = RequestId::next();
        if let Some((old, _)) = self.active.replace((request, Stage::Primary)) {
            tracing::debug!(%old, %request, "superseding document request");
        }
        self.path = Some(path.clone());
        self.state = DocumentState::Loading;
        self.blocks.clear();
        Effect::Fetch { request, path }
    }

    /// Applies a primary store result. Returns the fallback effect, if any.
    pub fn on_fetch_result(
        &mut self,
        request: RequestId,
        result: Result<String, StoreError>,
    ) -> Option<Effect> {
        if self.active != Some((request, Stage::Primary)) {
            tracing::debug!(%request, "dropping stale fetch result");
            return None;
        }
        let path = self.path.clone()?;

        match result {
            Ok(text) => {
                self.finish_loaded(text);
                None
            }
            Err(e) if e.is_not_found() => {
                self.finish(DocumentState::NotFound);
                None
            }
            Err(e) if self.static_fallback => {
                tracing::warn!(path = %path, error = %e, "fetch failed, trying static copy");
                let request = RequestId::next();
                self.active = Some((request, Stage::Static));
                Some(Effect::FetchStatic { request, path })
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "fetch failed");
                self.finish(DocumentState::Error(e.to_string()));
                None
            }
        }
    }

    /// Applies the static-copy result. Anything but real content is `NotFound`.
    pub fn on_static_result(&mut self, request: RequestId, result: Result<String, StoreError>) {
        if self.active != Some((request, Stage::Static)) {
            tracing::debug!(%request, "dropping stale static result");
            return;
        }
        match result {
            Ok(text) if !looks_like_fallback_page(&text) => self.finish_loaded(text),
            Ok(_) => {
                tracing::debug!("static lookup returned the generic fallback page");
                self.finish(DocumentState::NotFound);
            }
            Err(e) => {
                tracing::debug!(error = %e, "static lookup failed");
                self.finish(DocumentState::NotFound);
            }
        }
    }

    /// Re-issues the fetch; only valid in the `Error` state.
    pub fn retry(&mut self) -> Option<Effect> {
        if !self.can_retry() {
            return None;
        }
        let path = self.path.clone()?;
        Some(self.navigate(path))
    }

    /// Forgets the in-flight request so a late result is discarded.
    pub fn unmount(&mut self) {
        self.active = None;
        if self.state.is_loading() {
            self.state = DocumentState::Idle;
        }
    }

    fn finish_loaded(&mut self, text: String) {
        self.blocks = markdown::transform(&text);
        self.finish(DocumentState::Loaded(text));
    }

    fn finish(&mut self, state: DocumentState) {
        self.active = None;
        self.state = state;
    }
}

/// An HTML application shell served in place of a missing document.
pub fn looks_like_fallback_page(text: &str) -> bool {
    let head = text.trim_start();
    let prefix = head.get(..14).unwrap_or(head).to_ascii_lowercase();
    if prefix.starts_with("<!doctype html") || prefix.starts_with("<html") {
        return true;
    }
    // Bare markup fragment that mounts the app root.
    head.starts_with('<') && head.contains("<div id=\"root\">")
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/viewer.rs"]
mod tests;
