use super::*;
use crate::kernel::markdown::BlockKind;
use std::io;

fn path(raw: &str) -> DocPath {
    DocPath::parse(raw).unwrap()
}

fn loaded(text: &str) -> DocumentEditor {
    let mut editor = DocumentEditor::new(Duration::from_secs(5));
    let Some(Effect::Fetch { request, .. }) = editor.open(Some(path("docs/a.md"))) else {
        panic!("expected fetch");
    };
    editor.on_load_result(request, Ok(text.to_string()));
    editor
}

fn save_request(effect: &Effect) -> RequestId {
    match effect {
        Effect::Save { request, .. } => *request,
        other => panic!("expected save, got {other:?}"),
    }
}

#[test]
fn open_with_path_fetches_then_seeds_draft() {
    let mut editor = DocumentEditor::default();
    let effect = editor.open(Some(path("docs/a.md"))).expect("fetch effect");
    assert_eq!(editor.phase(), &EditorPhase::Loading);
    let request = effect.request().unwrap();

    editor.on_load_result(request, Ok("hello".to_string()));
    assert_eq!(editor.phase(), &EditorPhase::Ready);
    assert_eq!(editor.draft_text(), "hello");
    assert_eq!(editor.original(), "hello");
    assert!(!editor.is_dirty());
}

#[test]
fn open_without_path_starts_empty_and_ready() {
    let mut editor = DocumentEditor::default();
    assert!(editor.open(None).is_none());
    assert_eq!(editor.phase(), &EditorPhase::Ready);
    assert!(editor.draft().is_empty());
    assert!(editor.path().is_none());
}

#[test]
fn not_found_load_starts_new_document_at_path() {
    let mut editor = DocumentEditor::default();
    let p = path("docs/new.md");
    let request = editor.open(Some(p.clone())).unwrap().request().unwrap();
    editor.on_load_result(request, Err(StoreError::NotFound(p)));
    assert_eq!(editor.phase(), &EditorPhase::Ready);
    assert_eq!(editor.path().map(DocPath::as_str), Some("docs/new.md"));
    assert!(editor.draft().is_empty());
    assert!(matches!(editor.status(), Some(EditorStatus::Info(_))));
}

#[test]
fn other_load_errors_fail_the_session() {
    let mut editor = DocumentEditor::default();
    let request = editor.open(Some(path("docs/a.md"))).unwrap().request().unwrap();
    editor.on_load_result(
        request,
        Err(StoreError::Io(io::Error::new(io::ErrorKind::Other, "disk"))),
    );
    assert!(matches!(editor.phase(), EditorPhase::Failed(msg) if msg.contains("disk")));
    editor.insert_char('x');
    assert!(editor.draft().is_empty(), "failed sessions are read-only");
}

#[test]
fn stale_load_is_ignored() {
    let mut editor = DocumentEditor::default();
    let first = editor.open(Some(path("docs/a.md"))).unwrap().request().unwrap();
    let second = editor.open(Some(path("docs/b.md"))).unwrap().request().unwrap();
    editor.on_load_result(first, Ok("A".to_string()));
    assert_eq!(editor.phase(), &EditorPhase::Loading);
    editor.on_load_result(second, Ok("B".to_string()));
    assert_eq!(editor.draft_text(), "B");
}

#[test]
fn dirty_tracks_draft_against_original() {
    let mut editor = loaded("abc");
    editor.move_cursor(CursorMove::DocEnd);
    editor.insert_char('d');
    assert!(editor.is_dirty());
    editor.backspace();
    assert!(!editor.is_dirty(), "undoing the edit makes the draft clean again");
    editor.set_draft("xyz");
    assert!(editor.is_dirty());
}

#[test]
fn save_is_disabled_when_clean() {
    let mut editor = loaded("abc");
    assert_eq!(editor.save().unwrap_err(), EditorError::SaveDisabled);
    assert!(!editor.can_save());
}

#[test]
fn save_is_disabled_without_path_until_named() {
    let mut editor = DocumentEditor::default();
    editor.open(None);
    editor.insert_str("# New");
    assert_eq!(editor.save().unwrap_err(), EditorError::SaveDisabled);

    editor.set_path(path("docs/new"));
    let effect = editor.save().unwrap();
    match effect {
        Effect::Save { path, content, .. } => {
            assert_eq!(path.as_str(), "docs/new.md");
            assert_eq!(content, "# New");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn successful_save_clears_dirty() {
    let mut editor = loaded("abc");
    editor.move_cursor(CursorMove::DocEnd);
    editor.insert_char('!');
    let effect = editor.save().unwrap();
    assert_eq!(editor.phase(), &EditorPhase::Saving);
    assert_eq!(editor.save().unwrap_err(), EditorError::Busy);

    editor.on_save_result(save_request(&effect), Ok(()));
    assert_eq!(editor.phase(), &EditorPhase::Ready);
    assert!(!editor.is_dirty());
    assert_eq!(editor.original(), "abc!");
    assert!(matches!(editor.status(), Some(EditorStatus::Info(msg)) if msg.contains("docs/a.md")));
}

#[test]
fn failed_save_keeps_draft_and_dirty() {
    let mut editor = loaded("abc");
    editor.insert_char('>');
    let effect = editor.save().unwrap();
    editor.on_save_result(
        save_request(&effect),
        Err(StoreError::Unavailable("offline".to_string())),
    );
    assert_eq!(editor.phase(), &EditorPhase::Ready);
    assert!(editor.is_dirty());
    assert_eq!(editor.draft_text(), ">abc");
    assert_eq!(editor.original(), "abc");
    assert!(matches!(editor.status(), Some(EditorStatus::Error(msg)) if msg.contains("offline")));
    assert!(editor.can_save(), "explicit re-attempt is allowed");
}

#[test]
fn typing_during_save_stays_dirty_after_success() {
    let mut editor = loaded("abc");
    editor.insert_char('1');
    let effect = editor.save().unwrap();
    editor.insert_char('2');
    editor.on_save_result(save_request(&effect), Ok(()));
    assert_eq!(editor.original(), "1abc");
    assert!(editor.is_dirty());
}

#[test]
fn unknown_save_result_is_ignored() {
    let mut editor = loaded("abc");
    editor.insert_char('1');
    let effect = editor.save().unwrap();
    editor.on_save_result(RequestId::next(), Ok(()));
    assert_eq!(editor.phase(), &EditorPhase::Saving);
    editor.on_save_result(save_request(&effect), Ok(()));
    assert!(!editor.is_dirty());
}

#[test]
fn leaving_clean_editor_needs_no_confirmation() {
    let mut editor = loaded("abc");
    assert_eq!(editor.request_leave(), LeaveDecision::Leave);
    assert!(!editor.is_leave_pending());
}

#[test]
fn leaving_dirty_editor_asks_and_cancel_keeps_draft() {
    let mut editor = loaded("abc");
    editor.insert_char('x');
    assert_eq!(editor.cancel(), LeaveDecision::ConfirmDiscard);
    assert!(editor.is_leave_pending());

    assert!(!editor.resolve_leave(false));
    assert!(!editor.is_leave_pending());
    assert_eq!(editor.draft_text(), "xabc");
    assert!(editor.is_dirty());
    assert_eq!(editor.path().map(DocPath::as_str), Some("docs/a.md"));
}

#[test]
fn confirming_discard_drops_the_session() {
    let mut editor = loaded("abc");
    editor.insert_char('x');
    editor.request_leave();
    assert!(editor.resolve_leave(true));
    assert!(!editor.is_dirty());
    assert!(editor.path().is_none());
}

#[test]
fn preview_is_debounced_while_typing() {
    let mut editor = loaded("# Title");
    let start = Instant::now();
    editor.set_mode(EditorMode::Preview);
    assert_eq!(editor.preview_blocks(start).len(), 1);

    editor.move_cursor(CursorMove::DocEnd);
    editor.insert_str("\n\nparagraph");
    let blocks = editor.preview_blocks(Instant::now());
    assert_eq!(blocks.len(), 1, "still showing the previous render");
    assert!(editor.preview_due_at().is_some());

    let later = Instant::now() + Duration::from_secs(6);
    let kinds: Vec<_> = editor
        .preview_blocks(later)
        .iter()
        .map(RenderedBlock::kind)
        .collect();
    assert_eq!(kinds, vec![BlockKind::Heading, BlockKind::Paragraph]);
    assert!(editor.preview_due_at().is_none());
}

#[test]
fn switching_to_preview_renders_immediately() {
    let mut editor = loaded("one");
    editor.insert_str("# ");
    editor.set_mode(EditorMode::Preview);
    assert_eq!(editor.mode(), EditorMode::Preview);
    assert_eq!(editor.preview_blocks(Instant::now())[0].kind(), BlockKind::Heading);
    editor.toggle_mode();
    assert_eq!(editor.mode(), EditorMode::Edit);
}

#[test]
fn roundtrip_without_changes_never_writes() {
    let mut editor = loaded("same");
    editor.insert_char('x');
    editor.backspace();
    assert!(editor.save().is_err());
}

#[test]
fn owns_request_tracks_pending_load_and_save() {
    let mut editor = DocumentEditor::default();
    let load = editor
        .open(Some(path("docs/a.md")))
        .and_then(|e| e.request())
        .unwrap();
    assert!(editor.owns_request(load));

    editor.on_load_result(load, Ok("x".to_string()));
    assert!(!editor.owns_request(load));

    editor.insert_char('y');
    let save = save_request(&editor.save().unwrap());
    assert!(editor.owns_request(save));
    editor.on_save_result(save, Ok(()));
    assert!(!editor.owns_request(save));
}
