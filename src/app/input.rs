use super::{App, Focus, Screen};
use crate::kernel::editor::{CursorMove, EditorMode, LeaveDecision};
use crate::kernel::nav::NavActivation;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if self.handle_global_key(&key) {
            return;
        }
        match (self.screen, self.focus) {
            (Screen::Editor, _) => self.handle_editor_key(&key),
            (Screen::Viewer, Focus::Nav) => self.handle_nav_key(&key),
            (Screen::Viewer, Focus::Content) => self.handle_viewer_key(&key),
        }
    }

    fn handle_global_key(&mut self, key: &KeyEvent) -> bool {
        if !key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Char('q') => self.request_quit(),
            KeyCode::Char('b') if self.screen == Screen::Viewer => self.toggle_sidebar(),
            _ => return false,
        }
        true
    }

    fn handle_nav_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.nav.select_prev(&self.tree),
            KeyCode::Down | KeyCode::Char('j') => self.nav.select_next(&self.tree),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                match self.nav.activate_selected(&self.tree) {
                    NavActivation::Open(path) => self.open_document(path),
                    NavActivation::Toggled | NavActivation::None => {}
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(id) = self.nav.selected() {
                    if self.nav.is_expanded(id) {
                        self.nav.toggle(&self.tree, id);
                    }
                }
            }
            KeyCode::Tab => self.focus = Focus::Content,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_viewer_key(&mut self, key: &KeyEvent) {
        let page = self.content_height.max(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(page),
            KeyCode::PageDown | KeyCode::Char(' ') => {
                self.scroll = self.scroll.saturating_add(page);
            }
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            // Clamped to the last page on the next draw.
            KeyCode::End | KeyCode::Char('G') => self.scroll = usize::MAX,
            KeyCode::Char('e') => self.start_editing(),
            KeyCode::Char('r') => self.retry(),
            KeyCode::Tab | KeyCode::Esc if self.show_sidebar => self.focus = Focus::Nav,
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: &KeyEvent) {
        if self.editor.is_leave_pending() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let path = self.editor.path().cloned();
                    if self.editor.resolve_leave(true) {
                        self.leave_editor(path);
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.editor.resolve_leave(false);
                    self.quit_after_leave = false;
                }
                _ => {}
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => return self.save(),
            KeyCode::Char('p') if ctrl => {
                self.editor.toggle_mode();
                self.editor_scroll = 0;
                return;
            }
            KeyCode::Esc => {
                if self.editor.request_leave() == LeaveDecision::Leave {
                    let path = self.editor.path().cloned();
                    self.leave_editor(path);
                }
                return;
            }
            _ => {}
        }

        self.notice = None;
        match self.editor.mode() {
            EditorMode::Preview => self.handle_preview_key(key),
            EditorMode::Edit => self.handle_draft_key(key),
        }
    }

    fn handle_preview_key(&mut self, key: &KeyEvent) {
        let page = self.content_height.max(1);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.editor_scroll = self.editor_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.editor_scroll = self.editor_scroll.saturating_add(1);
            }
            KeyCode::PageUp => self.editor_scroll = self.editor_scroll.saturating_sub(page),
            KeyCode::PageDown => self.editor_scroll = self.editor_scroll.saturating_add(page),
            _ => {}
        }
    }

    fn handle_draft_key(&mut self, key: &KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.editor.insert_char(ch);
            }
            KeyCode::Enter => self.editor.insert_char('\n'),
            KeyCode::Tab => self.editor.insert_str("    "),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => self.editor.move_cursor(CursorMove::Left),
            KeyCode::Right => self.editor.move_cursor(CursorMove::Right),
            KeyCode::Up => self.editor.move_cursor(CursorMove::Up),
            KeyCode::Down => self.editor.move_cursor(CursorMove::Down),
            KeyCode::Home if ctrl => self.editor.move_cursor(CursorMove::DocStart),
            KeyCode::End if ctrl => self.editor.move_cursor(CursorMove::DocEnd),
            KeyCode::Home => self.editor.move_cursor(CursorMove::LineStart),
            KeyCode::End => self.editor.move_cursor(CursorMove::LineEnd),
            _ => {}
        }
    }
}
