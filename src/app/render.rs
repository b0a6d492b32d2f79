use super::theme::UiTheme;
use super::{App, Focus, Screen};
use crate::core::text_window::{compute_window_start, display_width, truncate_to_width};
use crate::kernel::editor::{EditorMode, EditorPhase, EditorStatus};
use crate::kernel::viewer::DocumentState;
use crate::views::{clamp_scroll_offset, DocLine};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::block::Title;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use std::time::Instant;

impl App {
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, rows[0]);

        let body = rows[1];
        if self.show_sidebar && self.screen == Screen::Viewer && body.width > self.sidebar_width {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(self.sidebar_width), Constraint::Min(0)])
                .split(body);
            self.render_sidebar(frame, cols[0]);
            self.render_content(frame, cols[1]);
        } else {
            self.render_content(frame, body);
        }

        self.render_status(frame, rows[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let current = match self.screen {
            Screen::Viewer => self.viewer.path(),
            Screen::Editor => self.editor.path(),
        };
        let mut spans = vec![Span::styled(
            " zdoc ",
            Style::default()
                .fg(self.theme.header_fg)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(path) = current {
            spans.push(Span::raw("· "));
            spans.push(Span::raw(self.tree.title_for(path)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Nav;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(focused))
            .title(" Docs ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = self.nav.visible_rows(&self.tree);
        let selected = self.nav.selected();
        let current = self.viewer.path();
        let mut lines = Vec::with_capacity(rows.len());
        let mut selected_idx = 0;

        for (idx, row) in rows.iter().enumerate() {
            let Some(node) = self.tree.get(row.id) else {
                continue;
            };
            let marker = match (row.is_branch, row.expanded) {
                (true, true) => "▾ ",
                (true, false) => "▸ ",
                (false, _) => "  ",
            };
            let mut text = format!("{}{}", "  ".repeat(row.depth), marker);
            if let Some(icon) = node.icon() {
                text.push_str(icon);
                text.push(' ');
            }
            text.push_str(node.title());

            let mut style = Style::default();
            if self.tree.is_active(row.id, current) {
                style = style
                    .bg(self.theme.nav_active_bg)
                    .add_modifier(Modifier::BOLD);
            }
            if selected == Some(row.id) {
                selected_idx = idx;
                if focused {
                    style = style.bg(self.theme.nav_selected_bg);
                }
            }
            let end = truncate_to_width(&text, inner.width as usize);
            lines.push(Line::from(Span::styled(text[..end].to_string(), style)));
        }

        let height = inner.height as usize;
        let offset = if height == 0 {
            0
        } else {
            selected_idx.saturating_sub(height - 1)
        };
        let offset = u16::try_from(offset).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
    }

    fn render_content(&mut self, frame: &mut Frame, area: Rect) {
        match self.screen {
            Screen::Viewer => self.render_viewer(frame, area),
            Screen::Editor => self.render_editor(frame, area),
        }
    }

    fn render_viewer(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Content;
        let title = self
            .viewer
            .path()
            .map_or_else(|| " zdoc ".to_string(), |p| format!(" {p} "));
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(focused))
            .title(title);
        if self.viewer.can_edit() {
            block = block.title(Title::from(" e edit ").alignment(Alignment::Right));
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.content_height = inner.height as usize;

        let path = self
            .viewer
            .path()
            .map_or_else(String::new, |p| p.to_string());
        let muted = Style::default().fg(self.theme.muted_fg);
        let error = Style::default().fg(self.theme.error_fg);

        let message: Vec<Line<'static>> = match self.viewer.state() {
            DocumentState::Idle => vec![Line::styled(
                "Select a document from the sidebar.",
                muted,
            )],
            DocumentState::Loading => vec![Line::styled(format!("Loading {path}…"), muted)],
            DocumentState::NotFound => vec![
                Line::styled(
                    "Document not found",
                    error.add_modifier(Modifier::BOLD),
                ),
                Line::raw(path),
                Line::raw(""),
                Line::styled("Press e to create it.", muted),
            ],
            DocumentState::Error(msg) => vec![
                Line::styled(
                    format!("Could not load {path}"),
                    error.add_modifier(Modifier::BOLD),
                ),
                Line::styled(msg.clone(), error),
                Line::raw(""),
                Line::styled("Press r to retry.", muted),
            ],
            DocumentState::Loaded(_) => {
                let (lines, _) =
                    self.view_cache
                        .get_or_present(self.viewer.blocks(), inner.width, &self.diagrams);
                self.scroll = clamp_scroll_offset(self.scroll, lines.len(), self.content_height);
                let visible = lines
                    .iter()
                    .skip(self.scroll)
                    .take(self.content_height)
                    .map(|line| doc_line_to_line(line, &self.theme))
                    .collect::<Vec<_>>();
                frame.render_widget(Paragraph::new(visible), inner);
                return;
            }
        };
        frame.render_widget(Paragraph::new(message), inner);
    }

    fn render_editor(&mut self, frame: &mut Frame, area: Rect) {
        let path = self
            .editor
            .path()
            .map_or_else(|| "untitled".to_string(), |p| p.to_string());
        let dirty = if self.editor.is_dirty() { " [+]" } else { "" };
        let mode = match self.editor.mode() {
            EditorMode::Edit => " edit ",
            EditorMode::Preview => " preview ",
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(true))
            .title(format!(" Editing {path}{dirty} "))
            .title(Title::from(mode).alignment(Alignment::Right));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.content_height = inner.height as usize;

        match self.editor.phase() {
            EditorPhase::Loading => {
                let muted = Style::default().fg(self.theme.muted_fg);
                frame.render_widget(
                    Paragraph::new(Line::styled(format!("Loading {path}…"), muted)),
                    inner,
                );
                return;
            }
            EditorPhase::Failed(msg) => {
                let error = Style::default().fg(self.theme.error_fg);
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::styled(format!("Could not open {path}"), error),
                        Line::styled(msg.clone(), error),
                    ]),
                    inner,
                );
                return;
            }
            EditorPhase::Ready | EditorPhase::Saving => {}
        }

        match self.editor.mode() {
            EditorMode::Edit => self.render_draft(frame, inner),
            EditorMode::Preview => self.render_preview(frame, inner),
        }
    }

    fn render_draft(&mut self, frame: &mut Frame, inner: Rect) {
        let height = inner.height as usize;
        let width = inner.width as usize;
        if height == 0 || width == 0 {
            return;
        }

        let draft = self.editor.draft();
        let (row, _) = draft.cursor();
        if row < self.editor_scroll {
            self.editor_scroll = row;
        } else if row >= self.editor_scroll + height {
            self.editor_scroll = row + 1 - height;
        }

        let mut lines = Vec::with_capacity(height);
        let mut cursor_x = 0;
        for idx in self.editor_scroll..(self.editor_scroll + height).min(draft.len_lines()) {
            let text = draft.line(idx).unwrap_or_default();
            let start = if idx == row {
                let cursor_byte = draft.cursor_byte_in_line();
                let start = compute_window_start(&text, cursor_byte, width);
                cursor_x = display_width(&text[start..cursor_byte]);
                start
            } else {
                0
            };
            let visible = &text[start..];
            let end = truncate_to_width(visible, width);
            lines.push(Line::raw(visible[..end].to_string()));
        }
        frame.render_widget(Paragraph::new(lines), inner);

        let x = inner.x + u16::try_from(cursor_x).unwrap_or(inner.width).min(inner.width);
        let y = inner.y + u16::try_from(row - self.editor_scroll).unwrap_or(0);
        frame.set_cursor_position((x, y));
    }

    fn render_preview(&mut self, frame: &mut Frame, inner: Rect) {
        let blocks = self.editor.preview_blocks(Instant::now());
        let (lines, _) = self
            .preview_cache
            .get_or_present(blocks, inner.width, &self.diagrams);
        self.editor_scroll =
            clamp_scroll_offset(self.editor_scroll, lines.len(), inner.height as usize);
        let visible = lines
            .iter()
            .skip(self.editor_scroll)
            .take(inner.height as usize)
            .map(|line| doc_line_to_line(line, &self.theme))
            .collect::<Vec<_>>();
        frame.render_widget(Paragraph::new(visible), inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let error = Style::default().fg(self.theme.error_fg);
        let info = Style::default().fg(self.theme.accent_fg);
        let muted = Style::default().fg(self.theme.muted_fg);

        let (left, left_style) = if let Some(notice) = self.notice() {
            (notice.to_string(), error)
        } else {
            match self.screen {
                Screen::Viewer => (viewer_status(self.viewer.state()), muted),
                Screen::Editor if self.editor.is_leave_pending() => (
                    "Discard unsaved changes? (y/n)".to_string(),
                    error.add_modifier(Modifier::BOLD),
                ),
                Screen::Editor if *self.editor.phase() == EditorPhase::Saving => {
                    ("Saving…".to_string(), info)
                }
                Screen::Editor => match self.editor.status() {
                    Some(EditorStatus::Info(msg)) => (msg.clone(), info),
                    Some(EditorStatus::Error(msg)) => (msg.clone(), error),
                    None => (String::new(), muted),
                },
            }
        };

        let hints = match (self.screen, self.focus) {
            (Screen::Viewer, Focus::Nav) => "↑↓ select  ⏎ open  tab content  ^B sidebar  ^Q quit",
            (Screen::Viewer, Focus::Content) => "↑↓ scroll  e edit  r retry  tab docs  ^Q quit",
            (Screen::Editor, _) => "^S save  ^P preview  esc close",
        };

        let width = area.width as usize;
        let hints_width = display_width(hints);
        let left_end = truncate_to_width(&left, width.saturating_sub(hints_width + 1));
        let left = &left[..left_end];
        let gap = width.saturating_sub(display_width(left) + hints_width);

        let line = Line::from(vec![
            Span::styled(left.to_string(), left_style),
            Span::raw(" ".repeat(gap)),
            Span::styled(hints, muted),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn viewer_status(state: &DocumentState) -> String {
    match state {
        DocumentState::Idle => String::new(),
        DocumentState::Loading => "loading".to_string(),
        DocumentState::Loaded(_) => "ready".to_string(),
        DocumentState::NotFound => "not found".to_string(),
        DocumentState::Error(_) => "error".to_string(),
    }
}

/// Splits a `DocLine` at every span boundary; overlapping spans patch the
/// style in order.
pub(super) fn doc_line_to_line(line: &DocLine, theme: &UiTheme) -> Line<'static> {
    if line.spans.is_empty() {
        return Line::raw(line.text.clone());
    }

    let mut cuts = vec![0, line.text.len()];
    for span in &line.spans {
        cuts.push(span.start.min(line.text.len()));
        cuts.push(span.end.min(line.text.len()));
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut spans = Vec::with_capacity(cuts.len());
    for pair in cuts.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let Some(text) = line.text.get(start..end) else {
            continue;
        };
        let style = line
            .spans
            .iter()
            .filter(|s| s.start <= start && end <= s.end)
            .fold(Style::default(), |acc, s| acc.patch(theme.style_for(s.kind)));
        spans.push(Span::styled(text.to_string(), style));
    }
    Line::from(spans)
}
