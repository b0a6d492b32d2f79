use super::*;
use crate::kernel::diagram::flowchart;

fn draw(src: &str) -> Vec<String> {
    render(&flowchart::parse(src, true).unwrap())
}

#[test]
fn top_down_single_edge() {
    assert_eq!(
        draw("graph TD\nA-->B"),
        vec![
            "┌───┐",
            "│ A │",
            "└─┬─┘",
            "  │",
            "  │",
            "  │",
            "  ▼",
            "┌───┐",
            "│ B │",
            "└───┘",
        ]
    );
}

#[test]
fn left_right_single_edge() {
    assert_eq!(
        draw("graph LR\nA-->B"),
        vec![
            "┌───┐      ┌───┐",
            "│ A ├─────▶│ B │",
            "└───┘      └───┘",
        ]
    );
}

#[test]
fn bottom_up_points_arrow_upward() {
    let lines = draw("graph BT\nA-->B");
    assert_eq!(lines[1], "│ B │");
    assert_eq!(lines[3], "  ▲");
    assert_eq!(lines[8], "│ A │");
}

#[test]
fn right_left_points_arrow_left() {
    let lines = draw("graph RL\nA-->B");
    assert_eq!(lines[1], "│ B │◀─────┤ A │");
}

#[test]
fn edge_label_sits_beside_target_segment() {
    let lines = draw("graph TD\nA-->|yes|B");
    assert_eq!(lines[5], "  │ yes");
}

#[test]
fn cycles_are_listed_beneath_the_graph() {
    let lines = draw("graph TD\nA-->B\nB-->|retry|A");
    let tail: Vec<&str> = lines.iter().rev().take(2).map(String::as_str).collect();
    assert_eq!(tail, vec!["↺ B → A (retry)", ""]);
    assert!(lines.iter().any(|l| l.contains("│ A │")));
}

#[test]
fn self_loop_is_a_back_edge() {
    let lines = draw("graph TD\nA-->A");
    assert_eq!(lines.last().map(String::as_str), Some("↺ A → A"));
}

#[test]
fn longest_path_puts_skip_edges_through_dummy_rows() {
    // A -> C directly and via B: C must sit two layers below A.
    let lines = draw("graph TD\nA-->B\nB-->C\nA-->C");
    let row_of = |label: &str| {
        lines
            .iter()
            .position(|l| l.contains(&format!("│ {label} │")))
            .unwrap()
    };
    assert_eq!(row_of("B") - row_of("A"), 7);
    assert_eq!(row_of("C") - row_of("A"), 14);
}

#[test]
fn fan_out_shares_a_junction() {
    let lines = draw("graph TD\nA-->B\nA-->C");
    assert!(lines.iter().any(|l| l.contains('┴') || l.contains('┬')));
    assert_eq!(lines.iter().filter(|l| l.contains('▼')).count(), 1);
    assert_eq!(
        lines.iter().map(|l| l.matches('▼').count()).sum::<usize>(),
        2
    );
}

#[test]
fn shapes_change_corners() {
    let lines = draw("graph TD\nA(Round)");
    assert!(lines[0].starts_with('╭'));
    let lines = draw("graph TD\nA{Pick}");
    assert!(lines[0].starts_with('◇'));
    let lines = draw("graph TD\nA((Hub))");
    assert!(lines[1].contains("( Hub )"));
}

#[test]
fn wide_labels_keep_boxes_closed() {
    let lines = draw("graph TD\nA[文档]");
    assert_eq!(lines[1], "│ 文档 │");
    assert_eq!(lines[0], "┌──────┐");
}
