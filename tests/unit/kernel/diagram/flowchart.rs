use super::*;

fn labels(chart: &Flowchart) -> Vec<&str> {
    chart.nodes.iter().map(|n| n.label.as_str()).collect()
}

fn pairs(chart: &Flowchart) -> Vec<(&str, &str)> {
    chart
        .edges
        .iter()
        .map(|e| (chart.nodes[e.from].id.as_str(), chart.nodes[e.to].id.as_str()))
        .collect()
}

#[test]
fn header_sets_direction() {
    for (src, dir) in [
        ("graph TD\nA", Direction::TopDown),
        ("graph TB\nA", Direction::TopDown),
        ("flowchart BT\nA", Direction::BottomUp),
        ("graph LR\nA", Direction::LeftRight),
        ("flowchart rl\nA", Direction::RightLeft),
        ("graph\nA", Direction::TopDown),
    ] {
        assert_eq!(parse(src, true).unwrap().direction, dir, "{src}");
    }
}

#[test]
fn unknown_direction_reports_header_line() {
    let err = parse("%% comment\ngraph XY\nA-->B", true).unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.message.contains("XY"));
}

#[test]
fn missing_header_is_an_error_only_when_required() {
    let err = parse("A-->B", true).unwrap_err();
    assert_eq!(err.line, 1);

    let chart = parse("A-->B", false).unwrap();
    assert_eq!(chart.direction, Direction::TopDown);
    assert_eq!(pairs(&chart), vec![("A", "B")]);
}

#[test]
fn node_shapes_and_labels() {
    let chart = parse(
        "graph TD\na[Rect]\nb(Round)\nc((Circle))\nd{Choice}\ne>Flag]\nf[(Store)]\ng[\"Quoted [x]\"]",
        true,
    )
    .unwrap();
    let shapes: Vec<NodeShape> = chart.nodes.iter().map(|n| n.shape).collect();
    assert_eq!(
        shapes,
        vec![
            NodeShape::Rect,
            NodeShape::Round,
            NodeShape::Circle,
            NodeShape::Diamond,
            NodeShape::Flag,
            NodeShape::Cylinder,
            NodeShape::Rect,
        ]
    );
    assert_eq!(
        labels(&chart),
        vec!["Rect", "Round", "Circle", "Choice", "Flag", "Store", "Quoted [x]"]
    );
}

#[test]
fn bare_reference_keeps_earlier_label() {
    let chart = parse("graph TD\nA[Start] --> B\nB --> A", true).unwrap();
    assert_eq!(labels(&chart), vec!["Start", "B"]);
    assert_eq!(chart.nodes.len(), 2);
}

#[test]
fn edge_operators_and_styles() {
    let chart = parse(
        "graph LR\nA --> B\nB --- C\nC -.-> D\nD ==> E\nE ----> F\nF -.- G\nG === H",
        true,
    )
    .unwrap();
    let styles: Vec<(EdgeStyle, bool)> = chart.edges.iter().map(|e| (e.style, e.arrow)).collect();
    assert_eq!(
        styles,
        vec![
            (EdgeStyle::Solid, true),
            (EdgeStyle::Solid, false),
            (EdgeStyle::Dotted, true),
            (EdgeStyle::Thick, true),
            (EdgeStyle::Solid, true),
            (EdgeStyle::Dotted, false),
            (EdgeStyle::Thick, false),
        ]
    );
}

#[test]
fn edge_labels_in_both_forms() {
    let chart = parse(
        "graph TD\nA -- yes --> B\nA -->|no| C\nB == sure ==> D\nC -. maybe .-> D",
        true,
    )
    .unwrap();
    let labels: Vec<Option<&str>> = chart.edges.iter().map(|e| e.label.as_deref()).collect();
    assert_eq!(
        labels,
        vec![Some("yes"), Some("no"), Some("sure"), Some("maybe")]
    );
    assert_eq!(chart.edges[3].style, EdgeStyle::Dotted);
}

#[test]
fn chains_and_fan_out() {
    let chart = parse("graph TD\nA --> B --> C\nA & B --> D & E", true).unwrap();
    assert_eq!(
        pairs(&chart),
        vec![
            ("A", "B"),
            ("B", "C"),
            ("A", "D"),
            ("A", "E"),
            ("B", "D"),
            ("B", "E"),
        ]
    );
}

#[test]
fn semicolons_comments_and_ignored_statements() {
    let src = "graph TD;\n%% a comment\nA-->B; B-->C\nsubgraph one\nC-->D\nend\nclassDef hot fill:#f00\nclass A hot\nstyle B fill:#0f0\nclick C callback\nlinkStyle 0 stroke:#f00";
    let chart = parse(src, true).unwrap();
    assert_eq!(pairs(&chart), vec![("A", "B"), ("B", "C"), ("C", "D")]);
}

#[test]
fn syntax_errors_carry_line_numbers() {
    let err = parse("graph TD\nA-->B\nB-->", true).unwrap_err();
    assert_eq!(err.line, 3);
    assert!(err.message.contains("target"), "{}", err.message);

    let err = parse("graph TD\nA-->B\n\nC[unclosed", true).unwrap_err();
    assert_eq!(err.line, 4);
    assert!(err.message.contains("unclosed"), "{}", err.message);

    let err = parse("graph TD\nA-->B\nB ?? C", true).unwrap_err();
    assert_eq!(err.line, 3);

    let err = parse("graph TD\nA -- never closed", true).unwrap_err();
    assert_eq!(err.line, 2);
}

#[test]
fn header_only_has_no_nodes() {
    let err = parse("graph TD\n%% nothing", true).unwrap_err();
    assert_eq!(err.line, 0);
}
