//! 终端前端：导航树 + 文档查看器 + 编辑器
//!
//! 职责：
//! - 持有各组件状态，把 `Effect` 交给 `AsyncRuntime` 执行
//! - 按 `RequestId` 把异步结果分发给发起请求的组件
//! - 键盘输入分发（input.rs）与绘制（render.rs）

pub mod theme;

mod input;
mod render;

use crate::kernel::diagram::DiagramCache;
use crate::kernel::editor::DocumentEditor;
use crate::kernel::effect::Effect;
use crate::kernel::markdown::RenderedBlock;
use crate::kernel::nav::NavState;
use crate::kernel::services::adapters::{AppMessage, AsyncRuntime};
use crate::kernel::services::ports::Settings;
use crate::kernel::viewer::{DocumentState, DocumentViewer};
use crate::models::{DocPath, NavTree};
use crate::views::RenderCache;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use theme::UiTheme;
use tokio::task::AbortHandle;

const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Viewer,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Nav,
    Content,
}

pub struct App {
    tree: NavTree,
    nav: NavState,
    viewer: DocumentViewer,
    editor: DocumentEditor,
    diagrams: DiagramCache,
    runtime: AsyncRuntime,
    rx: Receiver<AppMessage>,
    theme: UiTheme,
    screen: Screen,
    focus: Focus,
    fetch_handle: Option<AbortHandle>,
    view_cache: RenderCache,
    preview_cache: RenderCache,
    scroll: usize,
    editor_scroll: usize,
    content_height: usize,
    sidebar_width: u16,
    show_sidebar: bool,
    notice: Option<String>,
    quit_after_leave: bool,
    should_quit: bool,
}

impl App {
    pub fn new(runtime: AsyncRuntime, rx: Receiver<AppMessage>, settings: &Settings) -> Self {
        let tree = NavTree::default_docs();
        let nav = NavState::new(&tree);
        Self {
            viewer: DocumentViewer::new(runtime.has_static_fallback()),
            editor: DocumentEditor::new(Duration::from_millis(settings.preview_debounce_ms)),
            diagrams: DiagramCache::new(),
            theme: UiTheme::from_settings(&settings.theme),
            tree,
            nav,
            runtime,
            rx,
            screen: Screen::Viewer,
            focus: Focus::Nav,
            fetch_handle: None,
            view_cache: RenderCache::default(),
            preview_cache: RenderCache::default(),
            scroll: 0,
            editor_scroll: 0,
            content_height: 0,
            sidebar_width: settings.sidebar_width,
            show_sidebar: true,
            notice: None,
            quit_after_leave: false,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn tree(&self) -> &NavTree {
        &self.tree
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn viewer(&self) -> &DocumentViewer {
        &self.viewer
    }

    pub fn editor(&self) -> &DocumentEditor {
        &self.editor
    }

    pub fn diagrams(&self) -> &DiagramCache {
        &self.diagrams
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn toggle_sidebar(&mut self) {
        self.show_sidebar = !self.show_sidebar;
        if !self.show_sidebar {
            self.focus = Focus::Content;
        }
    }

    /// Shows `path` in the viewer and focuses it; an older fetch still in
    /// flight is aborted.
    pub fn open_document(&mut self, path: DocPath) {
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
        }
        self.nav.reveal(&self.tree, &path);
        let effect = self.viewer.navigate(path);
        self.focus = Focus::Content;
        self.scroll = 0;
        self.notice = None;
        self.fetch_handle = self.runtime.run(effect);
    }

    pub fn retry(&mut self) {
        if let Some(effect) = self.viewer.retry() {
            self.fetch_handle = self.runtime.run(effect);
        }
    }

    /// Opens the viewed document in the editor. A missing document opens as
    /// a new, empty one at the same path.
    pub fn start_editing(&mut self) {
        let editable =
            self.viewer.can_edit() || matches!(self.viewer.state(), DocumentState::NotFound);
        let Some(path) = self.viewer.path().cloned().filter(|_| editable) else {
            self.notice = Some("Nothing to edit".to_string());
            return;
        };
        self.notice = None;
        self.screen = Screen::Editor;
        self.focus = Focus::Content;
        self.editor_scroll = 0;
        self.preview_cache.clear();
        if let Some(effect) = self.editor.open(Some(path)) {
            self.runtime.run(effect);
        }
    }

    pub fn save(&mut self) {
        match self.editor.save() {
            Ok(effect) => {
                self.notice = None;
                self.runtime.run(effect);
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// Closes the editor and reloads `path`, the document it was editing.
    fn leave_editor(&mut self, path: Option<DocPath>) {
        self.editor.unmount();
        self.screen = Screen::Viewer;
        self.notice = None;
        if self.quit_after_leave {
            self.should_quit = true;
            return;
        }
        if let Some(path) = path {
            self.open_document(path);
        }
    }

    fn request_quit(&mut self) {
        if self.screen == Screen::Editor
            && self.editor.request_leave() == crate::kernel::LeaveDecision::ConfirmDiscard
        {
            self.quit_after_leave = true;
            return;
        }
        self.should_quit = true;
    }

    /// Routes one async result to the component that issued its request.
    pub fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Fetched {
                request,
                path,
                result,
            } => {
                if self.viewer.active_request() == Some(request) {
                    self.fetch_handle = None;
                    if let Some(effect) = self.viewer.on_fetch_result(request, result) {
                        self.fetch_handle = self.runtime.run(effect);
                    }
                    self.refresh_viewer_diagrams();
                } else if self.editor.owns_request(request) {
                    self.editor.on_load_result(request, result);
                } else {
                    tracing::debug!(%request, path = %path, "dropping stale fetch result");
                }
            }
            AppMessage::StaticFetched {
                request, result, ..
            } => {
                if self.viewer.active_request() == Some(request) {
                    self.fetch_handle = None;
                }
                self.viewer.on_static_result(request, result);
                self.refresh_viewer_diagrams();
            }
            AppMessage::Saved {
                request, result, ..
            } => self.editor.on_save_result(request, result),
            AppMessage::DiagramRendered { key, render } => {
                self.diagrams.complete(key, render);
            }
        }
    }

    fn refresh_viewer_diagrams(&mut self) {
        if !matches!(self.viewer.state(), DocumentState::Loaded(_)) {
            return;
        }
        self.diagrams.retain_blocks(self.viewer.blocks());
        let jobs = self.diagrams.request_all(self.viewer.blocks());
        self.spawn_diagrams(jobs);
    }

    fn spawn_diagrams(&self, jobs: Vec<crate::kernel::diagram::DiagramJob>) {
        for job in jobs {
            self.runtime.run(Effect::RenderDiagram(job));
        }
    }

    /// Drains pending messages and refreshes a due preview.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
        }

        if self.screen == Screen::Editor
            && self.editor.mode() == crate::kernel::EditorMode::Preview
        {
            let jobs = request_preview_diagrams(&mut self.editor, &mut self.diagrams, now);
            self.spawn_diagrams(jobs);
        }
    }

    /// How long the event loop may block before the next `tick`.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.editor
            .preview_due_at()
            .filter(|_| self.screen == Screen::Editor)
            .map_or(IDLE_POLL, |due| due.saturating_duration_since(now))
            .min(IDLE_POLL)
    }
}

fn request_preview_diagrams(
    editor: &mut DocumentEditor,
    diagrams: &mut DiagramCache,
    now: Instant,
) -> Vec<crate::kernel::diagram::DiagramJob> {
    let blocks: &[RenderedBlock] = editor.preview_blocks(now);
    diagrams.retain_blocks(blocks);
    diagrams.request_all(blocks)
}

#[cfg(test)]
#[path = "../../tests/unit/app/app.rs"]
mod tests;
