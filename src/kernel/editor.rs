//! Document editor: a draft buffer seeded from the store, edit / preview
//! modes, dirty tracking and explicit save.
//!
//! ```text
//! Loading → Ready(clean) ⇄ Ready(dirty) → Saving → Ready(clean)
//!                                          └─ failure → Ready(dirty)
//! ```

use crate::kernel::effect::{Effect, RequestId};
use crate::kernel::markdown::{self, RenderedBlock};
use crate::kernel::services::ports::settings::DEFAULT_PREVIEW_DEBOUNCE_MS;
use crate::kernel::services::ports::StoreError;
use crate::models::{DocPath, DraftBuffer};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Edit,
    Preview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorPhase {
    Loading,
    Ready,
    Saving,
    /// The initial load failed for a reason other than absence.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStatus {
    Info(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocStart,
    DocEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    Leave,
    ConfirmDiscard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorError {
    /// Nothing to save, or no path to save to.
    SaveDisabled,
    /// A load or save is still in flight.
    Busy,
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::SaveDisabled => write!(f, "save is disabled: no unsaved changes"),
            EditorError::Busy => write!(f, "editor is busy"),
        }
    }
}

impl std::error::Error for EditorError {}

#[derive(Debug)]
pub struct DocumentEditor {
    path: Option<DocPath>,
    phase: EditorPhase,
    mode: EditorMode,
    original: String,
    draft: DraftBuffer,
    dirty: bool,
    load_request: Option<RequestId>,
    save_request: Option<(RequestId, String)>,
    status: Option<EditorStatus>,
    leave_pending: bool,
    debounce: Duration,
    draft_version: u64,
    last_edit: Option<Instant>,
    preview: Vec<RenderedBlock>,
    preview_version: Option<u64>,
}

impl Default for DocumentEditor {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_PREVIEW_DEBOUNCE_MS))
    }
}

impl DocumentEditor {
    pub fn new(debounce: Duration) -> Self {
        Self {
            path: None,
            phase: EditorPhase::Ready,
            mode: EditorMode::Edit,
            original: String::new(),
            draft: DraftBuffer::new(),
            dirty: false,
            load_request: None,
            save_request: None,
            status: None,
            leave_pending: false,
            debounce,
            draft_version: 0,
            last_edit: None,
            preview: Vec::new(),
            preview_version: None,
        }
    }

    /// Starts a session. `None` opens an empty, unnamed document.
    pub fn open(&mut self, path: Option<DocPath>) -> Option<Effect> {
        self.reset_session(String::new());
        self.path = path.clone();
        self.load_request = None;
        self.phase = EditorPhase::Ready;
        let path = path?;

        let request = RequestId::next();
        self.load_request = Some(request);
        self.phase = EditorPhase::Loading;
        Some(Effect::Fetch { request, path })
    }

    pub fn on_load_result(&mut self, request: RequestId, result: Result<String, StoreError>) {
        if self.load_request != Some(request) {
            tracing::debug!(%request, "dropping stale editor load");
            return;
        }
        self.load_request = None;

        match result {
            Ok(text) => {
                self.reset_session(text);
                self.phase = EditorPhase::Ready;
            }
            Err(e) if e.is_not_found() => {
                self.reset_session(String::new());
                self.phase = EditorPhase::Ready;
                self.status = Some(EditorStatus::Info("New document".to_string()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "editor load failed");
                self.phase = EditorPhase::Failed(e.to_string());
                self.status = Some(EditorStatus::Error(e.to_string()));
            }
        }
    }

    fn reset_session(&mut self, original: String) {
        self.draft = DraftBuffer::from_text(&original);
        self.original = original;
        self.dirty = false;
        self.save_request = None;
        self.status = None;
        self.leave_pending = false;
        self.draft_version = self.draft_version.saturating_add(1);
        self.last_edit = None;
        self.preview.clear();
        self.preview_version = None;
    }

    pub fn path(&self) -> Option<&DocPath> {
        self.path.as_ref()
    }

    /// Names the document; the next save writes there.
    pub fn set_path(&mut self, path: DocPath) {
        self.path = Some(path);
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn draft(&self) -> &DraftBuffer {
        &self.draft
    }

    pub fn draft_text(&self) -> String {
        self.draft.text()
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> Option<&EditorStatus> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn is_leave_pending(&self) -> bool {
        self.leave_pending
    }

    pub fn can_save(&self) -> bool {
        self.phase == EditorPhase::Ready && self.dirty && self.path.is_some()
    }

    /// Whether a load or save with this id is still awaited.
    pub fn owns_request(&self, request: RequestId) -> bool {
        self.load_request == Some(request)
            || self
                .save_request
                .as_ref()
                .is_some_and(|(pending, _)| *pending == request)
    }

    fn is_editable(&self) -> bool {
        matches!(self.phase, EditorPhase::Ready | EditorPhase::Saving)
    }

    fn edited(&mut self) {
        self.dirty = !self.draft.matches(&self.original);
        self.draft_version = self.draft_version.saturating_add(1);
        self.last_edit = Some(Instant::now());
    }

    pub fn insert_char(&mut self, ch: char) {
        if self.is_editable() {
            self.draft.insert_char(ch);
            self.edited();
        }
    }

    pub fn insert_str(&mut self, s: &str) {
        if self.is_editable() && !s.is_empty() {
            self.draft.insert_str(s);
            self.edited();
        }
    }

    pub fn backspace(&mut self) {
        if self.is_editable() && self.draft.backspace() {
            self.edited();
        }
    }

    pub fn delete(&mut self) {
        if self.is_editable() && self.draft.delete() {
            self.edited();
        }
    }

    /// Replaces the whole draft.
    pub fn set_draft(&mut self, text: &str) {
        if self.is_editable() {
            self.draft.set_text(text);
            self.edited();
        }
    }

    pub fn move_cursor(&mut self, motion: CursorMove) {
        match motion {
            CursorMove::Left => self.draft.move_left(),
            CursorMove::Right => self.draft.move_right(),
            CursorMove::Up => self.draft.move_up(),
            CursorMove::Down => self.draft.move_down(),
            CursorMove::LineStart => self.draft.move_line_start(),
            CursorMove::LineEnd => self.draft.move_line_end(),
            CursorMove::DocStart => self.draft.move_doc_start(),
            CursorMove::DocEnd => self.draft.move_doc_end(),
        }
    }

    pub fn set_mode(&mut self, mode: EditorMode) {
        self.mode = mode;
        if mode == EditorMode::Preview {
            self.refresh_preview();
        }
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            EditorMode::Edit => EditorMode::Preview,
            EditorMode::Preview => EditorMode::Edit,
        };
        self.set_mode(next);
    }

    /// Preview blocks, re-transformed only after `debounce` of idle typing.
    pub fn preview_blocks(&mut self, now: Instant) -> &[RenderedBlock] {
        if self.preview_version != Some(self.draft_version) {
            let idle = self
                .last_edit
                .map_or(true, |at| now.saturating_duration_since(at) >= self.debounce);
            if idle || self.preview_version.is_none() {
                self.refresh_preview();
            }
        }
        &self.preview
    }

    /// When a stale preview becomes due, for scheduling a redraw.
    pub fn preview_due_at(&self) -> Option<Instant> {
        if self.preview_version == Some(self.draft_version) {
            return None;
        }
        self.last_edit.map(|at| at + self.debounce)
    }

    fn refresh_preview(&mut self) {
        self.preview = markdown::transform(&self.draft.text());
        self.preview_version = Some(self.draft_version);
    }

    pub fn save(&mut self) -> Result<Effect, EditorError> {
        if matches!(self.phase, EditorPhase::Loading | EditorPhase::Saving) {
            return Err(EditorError::Busy);
        }
        if !self.can_save() {
            return Err(EditorError::SaveDisabled);
        }
        let Some(path) = self.path.clone() else {
            return Err(EditorError::SaveDisabled);
        };

        let content = self.draft.text();
        let request = RequestId::next();
        self.save_request = Some((request, content.clone()));
        self.phase = EditorPhase::Saving;
        self.status = None;
        tracing::debug!(path = %path, %request, "saving document");
        Ok(Effect::Save {
            request,
            path,
            content,
        })
    }

    /// Applies a save result; a failure keeps the draft and its dirty flag.
    pub fn on_save_result(&mut self, request: RequestId, result: Result<(), StoreError>) {
        let Some((pending, content)) = self.save_request.take() else {
            return;
        };
        if pending != request {
            self.save_request = Some((pending, content));
            return;
        }

        self.phase = EditorPhase::Ready;
        match result {
            Ok(()) => {
                self.original = content;
                self.dirty = !self.draft.matches(&self.original);
                let saved = self
                    .path
                    .as_ref()
                    .map_or_else(String::new, |p| p.to_string());
                self.status = Some(EditorStatus::Info(format!("Saved {saved}")));
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.status = Some(EditorStatus::Error(format!("Save failed: {e}")));
            }
        }
    }

    /// Asks to leave the editor; dirty drafts need confirmation.
    pub fn request_leave(&mut self) -> LeaveDecision {
        if self.dirty {
            self.leave_pending = true;
            LeaveDecision::ConfirmDiscard
        } else {
            LeaveDecision::Leave
        }
    }

    pub fn cancel(&mut self) -> LeaveDecision {
        self.request_leave()
    }

    /// Answers a pending confirmation. Returns true when the editor may close.
    pub fn resolve_leave(&mut self, discard: bool) -> bool {
        if !self.leave_pending {
            return !self.dirty;
        }
        self.leave_pending = false;
        if discard {
            self.unmount();
        }
        discard
    }

    /// Drops the session; late load or save results are ignored.
    pub fn unmount(&mut self) {
        self.load_request = None;
        self.reset_session(String::new());
        self.path = None;
        self.phase = EditorPhase::Ready;
        self.mode = EditorMode::Edit;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/editor.rs"]
mod tests;
