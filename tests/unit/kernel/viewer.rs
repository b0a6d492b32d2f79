use super::*;
use crate::kernel::markdown::BlockKind;
use std::io;

fn path(raw: &str) -> DocPath {
    DocPath::parse(raw).unwrap()
}

fn fetch_request(effect: &Effect) -> RequestId {
    match effect {
        Effect::Fetch { request, .. } => *request,
        other => panic!("expected fetch, got {other:?}"),
    }
}

fn transient() -> StoreError {
    StoreError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
}

#[test]
fn navigate_emits_fetch_and_enters_loading() {
    let mut viewer = DocumentViewer::new(false);
    let effect = viewer.navigate(path("docs/quick-start.md"));
    match &effect {
        Effect::Fetch { path, .. } => assert_eq!(path.as_str(), "docs/quick-start.md"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(viewer.state().is_loading());
    assert_eq!(viewer.active_request(), Some(fetch_request(&effect)));
}

#[test]
fn loaded_content_is_transformed() {
    let mut viewer = DocumentViewer::new(false);
    let request = fetch_request(&viewer.navigate(path("docs/quick-start.md")));
    let effect = viewer.on_fetch_result(request, Ok("# Quick start\n\nHello.".to_string()));
    assert!(effect.is_none());
    assert_eq!(viewer.content(), Some("# Quick start\n\nHello."));
    let kinds: Vec<_> = viewer.blocks().iter().map(RenderedBlock::kind).collect();
    assert_eq!(kinds, vec![BlockKind::Heading, BlockKind::Paragraph]);
    assert!(viewer.can_edit());
    assert!(viewer.active_request().is_none());
}

#[test]
fn not_found_is_distinct_from_error() {
    let mut viewer = DocumentViewer::new(true);
    let p = path("docs/does-not-exist.md");
    let request = fetch_request(&viewer.navigate(p.clone()));
    let effect = viewer.on_fetch_result(request, Err(StoreError::NotFound(p)));
    assert!(effect.is_none(), "not found never falls back");
    assert_eq!(viewer.state(), &DocumentState::NotFound);
    assert!(!viewer.can_retry());
    assert!(!viewer.can_edit());
}

#[test]
fn transient_error_without_fallback_offers_retry() {
    let mut viewer = DocumentViewer::new(false);
    let request = fetch_request(&viewer.navigate(path("docs/a.md")));
    assert!(viewer.on_fetch_result(request, Err(transient())).is_none());
    assert!(matches!(viewer.state(), DocumentState::Error(msg) if msg.contains("reset")));
    assert!(viewer.can_retry());

    let retry = viewer.retry().expect("retry effect");
    let second = fetch_request(&retry);
    assert_ne!(second, request);
    assert!(viewer.state().is_loading());
    assert!(viewer.retry().is_none(), "retry only from the error state");
}

#[test]
fn transient_error_with_fallback_uses_static_copy() {
    let mut viewer = DocumentViewer::new(true);
    let request = fetch_request(&viewer.navigate(path("docs/a.md")));
    let effect = viewer.on_fetch_result(request, Err(transient()));
    let static_request = match effect {
        Some(Effect::FetchStatic { request, path }) => {
            assert_eq!(path.as_str(), "docs/a.md");
            request
        }
        other => panic!("expected static fetch, got {other:?}"),
    };
    assert!(viewer.state().is_loading());

    viewer.on_static_result(static_request, Ok("# Static".to_string()));
    assert_eq!(viewer.content(), Some("# Static"));
}

#[test]
fn fallback_html_shell_is_not_found() {
    let mut viewer = DocumentViewer::new(true);
    let request = fetch_request(&viewer.navigate(path("docs/a.md")));
    let Some(Effect::FetchStatic { request: s, .. }) =
        viewer.on_fetch_result(request, Err(transient()))
    else {
        panic!("expected static fetch");
    };
    viewer.on_static_result(
        s,
        Ok("<!DOCTYPE html><html><body><div id=\"root\"></div></body></html>".to_string()),
    );
    assert_eq!(viewer.state(), &DocumentState::NotFound);
}

#[test]
fn failed_static_lookup_is_not_found() {
    let mut viewer = DocumentViewer::new(true);
    let request = fetch_request(&viewer.navigate(path("docs/a.md")));
    let Some(Effect::FetchStatic { request: s, .. }) =
        viewer.on_fetch_result(request, Err(transient()))
    else {
        panic!("expected static fetch");
    };
    viewer.on_static_result(s, Err(transient()));
    assert_eq!(viewer.state(), &DocumentState::NotFound);
}

#[test]
fn slow_result_for_superseded_path_is_dropped() {
    let mut viewer = DocumentViewer::new(false);
    let a = fetch_request(&viewer.navigate(path("docs/a.md")));
    let b = fetch_request(&viewer.navigate(path("docs/b.md")));

    viewer.on_fetch_result(b, Ok("B".to_string()));
    viewer.on_fetch_result(a, Ok("A".to_string()));

    assert_eq!(viewer.path().map(DocPath::as_str), Some("docs/b.md"));
    assert_eq!(viewer.content(), Some("B"));
}

#[test]
fn stale_error_cannot_clobber_newer_load() {
    let mut viewer = DocumentViewer::new(true);
    let a = fetch_request(&viewer.navigate(path("docs/a.md")));
    let b = fetch_request(&viewer.navigate(path("docs/b.md")));
    assert!(viewer.on_fetch_result(a, Err(transient())).is_none());
    assert!(viewer.state().is_loading());
    viewer.on_fetch_result(b, Ok("B".to_string()));
    assert_eq!(viewer.content(), Some("B"));
}

#[test]
fn primary_result_is_ignored_once_static_lookup_started() {
    let mut viewer = DocumentViewer::new(true);
    let request = fetch_request(&viewer.navigate(path("docs/a.md")));
    assert!(viewer.on_fetch_result(request, Err(transient())).is_some());
    assert!(viewer
        .on_fetch_result(request, Ok("late".to_string()))
        .is_none());
    assert!(viewer.state().is_loading());
}

#[test]
fn unmount_discards_late_results() {
    let mut viewer = DocumentViewer::new(false);
    let request = fetch_request(&viewer.navigate(path("docs/a.md")));
    viewer.unmount();
    viewer.on_fetch_result(request, Ok("late".to_string()));
    assert_eq!(viewer.state(), &DocumentState::Idle);
    assert!(viewer.content().is_none());
}

#[test]
fn fallback_page_detection() {
    assert!(looks_like_fallback_page("<!doctype html>\n<html></html>"));
    assert!(looks_like_fallback_page("  <html lang=\"en\">"));
    assert!(looks_like_fallback_page("<body><div id=\"root\"></div></body>"));
    assert!(!looks_like_fallback_page("# Title\n\n<div>inline html</div>"));
    assert!(!looks_like_fallback_page(""));
    assert!(!looks_like_fallback_page(
        "# Mounting\n\n```html\n<div id=\"root\"></div>\n```\n"
    ));
}
