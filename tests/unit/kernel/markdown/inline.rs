use super::*;

fn spans_of(text: &InlineText, kind: InlineKind) -> Vec<&str> {
    text.spans
        .iter()
        .filter(|s| s.kind == kind)
        .map(|s| &text.text[s.start..s.end])
        .collect()
}

#[test]
fn emphasis_markers_are_hidden_and_styled() {
    let out = parse_inline("a **bold** and *italic* and ~~gone~~");
    assert_eq!(out.text, "a bold and italic and gone");
    assert_eq!(spans_of(&out, InlineKind::Bold), vec!["bold"]);
    assert_eq!(spans_of(&out, InlineKind::Italic), vec!["italic"]);
    assert_eq!(spans_of(&out, InlineKind::Strike), vec!["gone"]);
}

#[test]
fn underscore_emphasis_respects_word_boundaries() {
    let out = parse_inline("__strong__ _em_ snake_case_name");
    assert_eq!(out.text, "strong em snake_case_name");
    assert_eq!(spans_of(&out, InlineKind::Bold), vec!["strong"]);
    assert_eq!(spans_of(&out, InlineKind::Italic), vec!["em"]);
}

#[test]
fn nested_emphasis_inside_bold() {
    let out = parse_inline("**bold `code` here**");
    assert_eq!(out.text, "bold code here");
    assert_eq!(spans_of(&out, InlineKind::Bold), vec!["bold code here"]);
    assert_eq!(spans_of(&out, InlineKind::Code), vec!["code"]);
}

#[test]
fn code_span_supports_longer_backtick_runs() {
    let out = parse_inline("use `` a`b `` now");
    assert_eq!(out.text, "use a`b now");
    assert_eq!(spans_of(&out, InlineKind::Code), vec!["a`b"]);
}

#[test]
fn code_span_content_is_not_parsed() {
    let out = parse_inline("`**not bold**`");
    assert_eq!(out.text, "**not bold**");
    assert!(!out.has_span(InlineKind::Bold));
}

#[test]
fn unclosed_markers_render_literally() {
    let out = parse_inline("an **unclosed bold and `tick and [link](");
    assert_eq!(out.text, "an **unclosed bold and `tick and [link](");
    assert!(out.spans.is_empty());
}

#[test]
fn spaced_asterisks_are_not_emphasis() {
    let out = parse_inline("2 * 3 * 4");
    assert_eq!(out.text, "2 * 3 * 4");
    assert!(out.spans.is_empty());
}

#[test]
fn links_record_targets() {
    let out = parse_inline("see [the guide](docs/guide.md \"Guide\") now");
    assert_eq!(out.text, "see the guide now");
    assert_eq!(spans_of(&out, InlineKind::Link), vec!["the guide"]);
    assert_eq!(out.links.len(), 1);
    assert_eq!(out.links[0].target, "docs/guide.md");
    assert_eq!(&out.text[out.links[0].start..out.links[0].end], "the guide");
}

#[test]
fn images_show_alt_text() {
    let out = parse_inline("![arch diagram](img/arch.png)");
    assert_eq!(out.text, "arch diagram");
    assert_eq!(spans_of(&out, InlineKind::Image), vec!["arch diagram"]);
    assert_eq!(out.links[0].target, "img/arch.png");
}

#[test]
fn autolinks_and_plain_angle_brackets() {
    let out = parse_inline("visit <https://example.com/x> or a < b > c");
    assert_eq!(out.text, "visit https://example.com/x or a < b > c");
    assert_eq!(out.links.len(), 1);
    assert_eq!(out.links[0].target, "https://example.com/x");
}

#[test]
fn backslash_escapes_drop_the_backslash() {
    let out = parse_inline(r"\*not italic\* and \[x\]");
    assert_eq!(out.text, "*not italic* and [x]");
    assert!(out.spans.is_empty());
}

#[test]
fn multibyte_text_survives() {
    let out = parse_inline("中文 **粗体** ok");
    assert_eq!(out.text, "中文 粗体 ok");
    assert_eq!(spans_of(&out, InlineKind::Bold), vec!["粗体"]);
}
