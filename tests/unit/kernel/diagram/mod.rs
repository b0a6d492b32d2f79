use super::*;
use crate::kernel::markdown::transform;

#[test]
fn diagram_languages_are_case_insensitive() {
    for tag in ["mermaid", "Mermaid", "flowchart", "SEQUENCE", "sequenceDiagram"] {
        assert!(is_diagram_language(tag), "{tag}");
    }
    for tag in ["", "rust", "dot", "mermaidjs"] {
        assert!(!is_diagram_language(tag), "{tag}");
    }
}

#[test]
fn header_picks_dialect_regardless_of_tag() {
    let flow = render("sequence", "graph LR\nA-->B").unwrap();
    assert!(flow[1].contains('▶'));

    let seq = render("flowchart", "sequenceDiagram\nA->>B: hi").unwrap();
    assert!(seq.iter().any(|l| l.contains("hi")));
}

#[test]
fn tag_implies_dialect_without_header() {
    assert!(render("flowchart", "A-->B").is_ok());
    assert!(render("sequence", "A->>B: hi").is_ok());

    let err = render("mermaid", "A-->B").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.message.contains("unsupported"));
}

#[test]
fn unsupported_mermaid_types_name_the_type() {
    let err = render("mermaid", "%% pie\npie title Pets\n\"Dogs\" : 386").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.to_string(), "line 2: unsupported diagram type `pie`");
}

#[test]
fn empty_source_is_an_error() {
    let err = render("mermaid", "  \n%% nothing\n").unwrap_err();
    assert_eq!(err.line, 0);
    assert_eq!(err.to_string(), "diagram is empty");
}

#[test]
fn statements_split_outside_brackets() {
    let parts: Vec<&str> = statements("A[x;y] --> B; B --> C;").collect();
    assert_eq!(parts, vec!["A[x;y] --> B", "B --> C"]);
    let parts: Vec<&str> = statements("A[\"a ; b\"]").collect();
    assert_eq!(parts, vec!["A[\"a ; b\"]"]);
}

#[test]
fn every_render_gets_a_fresh_id() {
    let a = render_isolated("mermaid", "graph TD\nA-->B");
    let b = render_isolated("mermaid", "graph TD\nA-->B");
    assert_ne!(a.id, b.id);
    assert_eq!(a.result, b.result);
    assert!(a.id.to_string().starts_with("diagram-"));
}

#[test]
fn isolated_render_reports_syntax_errors() {
    let out = render_isolated("mermaid", "graph TD\nA-->");
    let err = out.result.unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn panic_payloads_become_messages() {
    let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "boom");
    let payload = std::panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
    assert_eq!(panic_message(payload.as_ref()), "owned");
}

#[test]
fn cache_requests_each_source_once() {
    let mut cache = DiagramCache::new();
    let job = cache.request("mermaid", "graph TD\nA-->B").unwrap();
    assert!(cache.request("mermaid", "graph TD\nA-->B").is_none());
    assert!(matches!(
        cache.get("mermaid", "graph TD\nA-->B"),
        Some(DiagramSlot::Pending)
    ));

    let revision = cache.revision();
    assert!(cache.complete(job.key, job.run()));
    assert!(cache.revision() > revision);
    assert!(matches!(
        cache.get("mermaid", "graph TD\nA-->B"),
        Some(DiagramSlot::Ready(r)) if r.result.is_ok()
    ));
    assert!(cache.request("mermaid", "graph TD\nA-->B").is_none());
}

#[test]
fn changed_source_is_a_new_render() {
    let mut cache = DiagramCache::new();
    assert!(cache.request("mermaid", "graph TD\nA-->B").is_some());
    assert!(cache.request("mermaid", "graph TD\nA-->C").is_some());
    assert_eq!(cache.len(), 2);
}

#[test]
fn results_for_dropped_sources_are_discarded() {
    let mut cache = DiagramCache::new();
    let blocks = transform("```mermaid\ngraph TD\nA-->B\n```");
    let jobs = cache.request_all(&blocks);
    assert_eq!(jobs.len(), 1);

    cache.retain_blocks(&transform("no diagrams left"));
    assert!(cache.is_empty());
    assert!(!cache.complete(jobs[0].key, jobs[0].run()));
    assert!(cache.is_empty());
}

#[test]
fn render_all_now_fills_every_slot_including_failures() {
    let mut cache = DiagramCache::new();
    let blocks = transform(
        "```mermaid\ngraph TD\nA-->B\n```\n\n> ```sequence\n> A->>B: hi\n> ```\n\n```mermaid\nnot a diagram\n```",
    );
    cache.render_all_now(&blocks);
    assert_eq!(cache.len(), 3);
    let failed = match cache.get("mermaid", "not a diagram") {
        Some(DiagramSlot::Ready(r)) => r.result.clone().unwrap_err(),
        other => panic!("unexpected slot {other:?}"),
    };
    assert_eq!(failed.line, 1);
}
