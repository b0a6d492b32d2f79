use super::*;

#[test]
fn insert_and_backspace_track_cursor() {
    let mut buf = DraftBuffer::new();
    buf.insert_str("hello");
    assert_eq!(buf.cursor(), (0, 5));
    buf.insert_char('\n');
    buf.insert_str("world");
    assert_eq!(buf.text(), "hello\nworld");
    assert_eq!(buf.cursor(), (1, 5));

    buf.move_line_start();
    assert!(buf.backspace());
    assert_eq!(buf.text(), "helloworld");
    assert_eq!(buf.cursor(), (0, 5));
}

#[test]
fn backspace_at_start_is_noop() {
    let mut buf = DraftBuffer::from_text("abc");
    assert!(!buf.backspace());
    assert_eq!(buf.text(), "abc");
}

#[test]
fn backspace_removes_crlf_as_one_break() {
    let mut buf = DraftBuffer::from_text("a\r\nb");
    buf.set_cursor(1, 0);
    assert!(buf.backspace());
    assert_eq!(buf.text(), "ab");
    assert_eq!(buf.cursor(), (0, 1));
}

#[test]
fn delete_joins_lines_at_line_end() {
    let mut buf = DraftBuffer::from_text("ab\ncd");
    buf.move_line_end();
    assert!(buf.delete());
    assert_eq!(buf.text(), "abcd");
    buf.move_doc_end();
    assert!(!buf.delete());
}

#[test]
fn graphemes_move_as_single_units() {
    let mut buf = DraftBuffer::from_text("e\u{301}x");
    buf.move_right();
    assert_eq!(buf.cursor(), (0, 1));
    assert!(buf.backspace());
    assert_eq!(buf.text(), "x");
}

#[test]
fn vertical_motion_remembers_preferred_column() {
    let mut buf = DraftBuffer::from_text("long line\nab\nanother long");
    buf.set_cursor(0, 7);
    buf.move_down();
    assert_eq!(buf.cursor(), (1, 2));
    buf.move_down();
    assert_eq!(buf.cursor(), (2, 7));
    buf.move_up();
    buf.move_up();
    assert_eq!(buf.cursor(), (0, 7));
}

#[test]
fn set_cursor_clamps_to_buffer() {
    let mut buf = DraftBuffer::from_text("ab\nc");
    buf.set_cursor(10, 10);
    assert_eq!(buf.cursor(), (1, 1));
}

#[test]
fn matches_compares_whole_text() {
    let mut buf = DraftBuffer::from_text("same");
    assert!(buf.matches("same"));
    buf.move_line_end();
    buf.insert_char('!');
    assert!(!buf.matches("same"));
    buf.backspace();
    assert!(buf.matches("same"));
}

#[test]
fn cursor_byte_in_line_accounts_for_multibyte() {
    let mut buf = DraftBuffer::from_text("你好a");
    buf.set_cursor(0, 2);
    assert_eq!(buf.cursor_byte_in_line(), "你好".len());
}
