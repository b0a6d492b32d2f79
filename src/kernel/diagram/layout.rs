//! Layered flowchart layout drawn onto a [`Canvas`].
//!
//! Back edges are found by DFS and drawn as a list beneath the graph. The
//! remaining DAG gets longest-path ranks; edges spanning several ranks are
//! split by dummy items so every routed segment joins adjacent layers. Items
//! are ordered inside a layer by one barycenter sweep.

use crate::core::text_window::display_width;

use super::canvas::{Canvas, LineStyle};
use super::flowchart::{EdgeStyle, FlowEdge, Flowchart, NodeShape};

const BOX_HEIGHT: usize = 3;
/// Rows between two vertical layers: stub, channel, label, arrow.
const V_GAP: usize = 4;
const H_SPACING: usize = 3;
const V_SPACING: usize = 1;
const MIN_H_GAP: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Node(usize),
    Dummy,
}

#[derive(Debug, Clone)]
struct Item {
    kind: ItemKind,
    layer: usize,
    /// Main-axis extent for boxes, 1 for dummies (vertical mode).
    width: usize,
    x: usize,
    y: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    /// Item in the lower-numbered layer.
    near: usize,
    /// Item in the next layer.
    far: usize,
    edge: usize,
}

pub fn render(chart: &Flowchart) -> Vec<String> {
    let back = back_edges(chart);
    let ranks = longest_path_ranks(chart, &back);
    let max_rank = ranks.iter().copied().max().unwrap_or(0);
    let reversed = chart.direction.is_reversed();
    let layer_of = |rank: usize| if reversed { max_rank - rank } else { rank };

    let mut items: Vec<Item> = chart
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| Item {
            kind: ItemKind::Node(idx),
            layer: layer_of(ranks[idx]),
            width: box_width(&node.label, node.shape),
            x: 0,
            y: 0,
        })
        .collect();

    let mut segments = Vec::new();
    for (edge_idx, edge) in chart.edges.iter().enumerate() {
        if back.contains(&edge_idx) {
            continue;
        }
        let (a, b) = (layer_of(ranks[edge.from]), layer_of(ranks[edge.to]));
        let (mut near, far_item, lo, hi) = if a < b {
            (edge.from, edge.to, a, b)
        } else {
            (edge.to, edge.from, b, a)
        };
        for layer in lo + 1..hi {
            items.push(Item {
                kind: ItemKind::Dummy,
                layer,
                width: 1,
                x: 0,
                y: 0,
            });
            let dummy = items.len() - 1;
            segments.push(Segment {
                near,
                far: dummy,
                edge: edge_idx,
            });
            near = dummy;
        }
        segments.push(Segment {
            near,
            far: far_item,
            edge: edge_idx,
        });
    }

    let layers = order_layers(&items, &segments, max_rank + 1);

    let mut canvas = Canvas::new();
    if chart.direction.is_vertical() {
        place_vertical(&mut items, &layers);
        draw_vertical(&mut canvas, chart, &items, &segments);
    } else {
        let columns = place_horizontal(&mut items, &layers, chart, &segments);
        draw_horizontal(&mut canvas, chart, &items, &segments, &columns);
    }
    for item in &items {
        if let ItemKind::Node(idx) = item.kind {
            draw_node(&mut canvas, item, &chart.nodes[idx].label, chart.nodes[idx].shape);
        }
    }

    let mut lines = canvas.into_lines();
    if !back.is_empty() {
        lines.push(String::new());
        for &edge_idx in &back {
            lines.push(describe_back_edge(chart, &chart.edges[edge_idx]));
        }
    }
    lines
}

fn describe_back_edge(chart: &Flowchart, edge: &FlowEdge) -> String {
    let from = &chart.nodes[edge.from].label;
    let to = &chart.nodes[edge.to].label;
    let arrow = if edge.arrow { "→" } else { "─" };
    match &edge.label {
        Some(label) => format!("↺ {from} {arrow} {to} ({label})"),
        None => format!("↺ {from} {arrow} {to}"),
    }
}

/// Edges closing a cycle in declaration-order DFS, self loops included.
fn back_edges(chart: &Flowchart) -> Vec<usize> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    let n = chart.nodes.len();
    let mut outgoing = vec![Vec::new(); n];
    for (idx, edge) in chart.edges.iter().enumerate() {
        outgoing[edge.from].push(idx);
    }

    let mut marks = vec![Mark::New; n];
    let mut back = Vec::new();
    for root in 0..n {
        if marks[root] != Mark::New {
            continue;
        }
        // Explicit stack of (node, next outgoing index).
        let mut stack = vec![(root, 0usize)];
        marks[root] = Mark::Active;
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            top.1 += 1;
            if let Some(&edge_idx) = outgoing[node].get(next) {
                let to = chart.edges[edge_idx].to;
                match marks[to] {
                    Mark::Active => back.push(edge_idx),
                    Mark::New => {
                        marks[to] = Mark::Active;
                        stack.push((to, 0));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                stack.pop();
            }
        }
    }
    back.sort_unstable();
    back
}

/// Longest path from any source over the acyclic edges (Kahn order).
fn longest_path_ranks(chart: &Flowchart, back: &[usize]) -> Vec<usize> {
    let n = chart.nodes.len();
    let mut indegree = vec![0usize; n];
    let mut outgoing = vec![Vec::new(); n];
    for (idx, edge) in chart.edges.iter().enumerate() {
        if back.contains(&idx) {
            continue;
        }
        indegree[edge.to] += 1;
        outgoing[edge.from].push(edge.to);
    }

    let mut rank = vec![0usize; n];
    let mut queue: std::collections::VecDeque<usize> =
        (0..n).filter(|&i| indegree[i] == 0).collect();
    while let Some(node) = queue.pop_front() {
        for &to in &outgoing[node] {
            rank[to] = rank[to].max(rank[node] + 1);
            indegree[to] -= 1;
            if indegree[to] == 0 {
                queue.push_back(to);
            }
        }
    }
    rank
}

/// Item indices per layer, ordered by one downward barycenter sweep.
fn order_layers(items: &[Item], segments: &[Segment], count: usize) -> Vec<Vec<usize>> {
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (idx, item) in items.iter().enumerate() {
        layers[item.layer].push(idx);
    }

    let mut position = vec![0usize; items.len()];
    for layer in &layers {
        for (pos, &idx) in layer.iter().enumerate() {
            position[idx] = pos;
        }
    }

    for layer_idx in 1..count {
        let mut keyed: Vec<(f64, usize, usize)> = layers[layer_idx]
            .iter()
            .enumerate()
            .map(|(pos, &idx)| {
                let preds: Vec<usize> = segments
                    .iter()
                    .filter(|s| s.far == idx)
                    .map(|s| position[s.near])
                    .collect();
                let key = if preds.is_empty() {
                    pos as f64
                } else {
                    preds.iter().sum::<usize>() as f64 / preds.len() as f64
                };
                (key, pos, idx)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        layers[layer_idx] = keyed.into_iter().map(|(_, _, idx)| idx).collect();
        for (pos, &idx) in layers[layer_idx].iter().enumerate() {
            position[idx] = pos;
        }
    }
    layers
}

fn box_width(label: &str, shape: NodeShape) -> usize {
    let pad = if shape == NodeShape::Circle { 8 } else { 4 };
    display_width(label) + pad
}

fn center(item: &Item) -> usize {
    item.x + item.width / 2
}

fn place_vertical(items: &mut [Item], layers: &[Vec<usize>]) {
    let extent = |layer: &Vec<usize>, items: &[Item]| -> usize {
        let widths: usize = layer.iter().map(|&i| items[i].width).sum();
        widths + H_SPACING * layer.len().saturating_sub(1)
    };
    let widest = layers.iter().map(|l| extent(l, items)).max().unwrap_or(0);

    for (layer_idx, layer) in layers.iter().enumerate() {
        let mut x = (widest - extent(layer, items)) / 2;
        let y = layer_idx * (BOX_HEIGHT + V_GAP);
        for &idx in layer {
            items[idx].x = x;
            items[idx].y = y;
            x += items[idx].width + H_SPACING;
        }
    }
}

fn edge_line_style(style: EdgeStyle) -> LineStyle {
    match style {
        EdgeStyle::Solid => LineStyle::Light,
        EdgeStyle::Dotted => LineStyle::Dotted,
        EdgeStyle::Thick => LineStyle::Thick,
    }
}

/// The segment adjacent to the edge target carries the arrow and the label.
fn targets_far(chart: &Flowchart, items: &[Item], seg: &Segment) -> Option<bool> {
    let target = chart.edges[seg.edge].to;
    if items[seg.far].kind == ItemKind::Node(target) {
        Some(true)
    } else if items[seg.near].kind == ItemKind::Node(target) {
        Some(false)
    } else {
        None
    }
}

fn draw_vertical(canvas: &mut Canvas, chart: &Flowchart, items: &[Item], segments: &[Segment]) {
    for item in items.iter().filter(|i| i.kind == ItemKind::Dummy) {
        canvas.vline(item.x, item.y, item.y + BOX_HEIGHT - 1, LineStyle::Light);
    }

    let reversed = chart.direction.is_reversed();
    let mut labels = Vec::new();
    for seg in segments {
        let edge = &chart.edges[seg.edge];
        let style = edge_line_style(edge.style);
        let (near, far) = (&items[seg.near], &items[seg.far]);
        let (xn, xf) = (center(near), center(far));
        let top = near.y + BOX_HEIGHT;
        let bottom = top + V_GAP - 1;
        // Channel sits on the source side, label row on the target side.
        let (channel, label_row) = if reversed {
            (top + 2, top + 1)
        } else {
            (top + 1, top + 2)
        };
        let toward_far = targets_far(chart, items, seg);
        let arrow_near = edge.arrow && toward_far == Some(false);
        let arrow_far = edge.arrow && toward_far == Some(true);

        canvas.vline(xn, if arrow_near { top } else { top - 1 }, channel, style);
        canvas.hline(channel, xn, xf, style);
        canvas.vline(xf, channel, if arrow_far { bottom } else { bottom + 1 }, style);

        if arrow_far {
            canvas.glyph(xf, bottom, '▼');
        }
        if arrow_near {
            canvas.glyph(xn, top, '▲');
        }
        if let Some(label) = &edge.label {
            match toward_far {
                Some(true) => labels.push((xf, label_row, label.as_str())),
                Some(false) => labels.push((xn, label_row, label.as_str())),
                None => {}
            }
        }
    }
    for (x, y, label) in labels {
        place_label(canvas, x, y, label);
    }
}

/// Right of the line when free, else left of it, else over whatever is there.
fn place_label(canvas: &mut Canvas, x: usize, y: usize, label: &str) {
    if canvas.text_if_free(x + 2, y, label) {
        return;
    }
    let width = display_width(label);
    if x >= width + 2 && canvas.text_if_free(x - width - 1, y, label) {
        return;
    }
    canvas.text(x + 2, y, label);
}

/// Left edge and width of every column in horizontal mode.
struct Columns {
    spans: Vec<(usize, usize)>,
}

fn place_horizontal(
    items: &mut [Item],
    layers: &[Vec<usize>],
    chart: &Flowchart,
    segments: &[Segment],
) -> Columns {
    let height = |idx: usize, items: &[Item]| match items[idx].kind {
        ItemKind::Node(_) => BOX_HEIGHT,
        ItemKind::Dummy => 1,
    };
    let extent = |layer: &Vec<usize>, items: &[Item]| -> usize {
        let h: usize = layer.iter().map(|&i| height(i, items)).sum();
        h + V_SPACING * layer.len().saturating_sub(1)
    };
    let tallest = layers.iter().map(|l| extent(l, items)).max().unwrap_or(0);

    // Each gap must fit the widest label routed through it.
    let mut gaps = vec![MIN_H_GAP; layers.len()];
    for seg in segments {
        if let Some(label) = &chart.edges[seg.edge].label {
            let gap = &mut gaps[items[seg.near].layer];
            *gap = (*gap).max(display_width(label) + 7);
        }
    }

    let mut spans = Vec::with_capacity(layers.len());
    let mut x = 0;
    for (layer_idx, layer) in layers.iter().enumerate() {
        let column_width = layer
            .iter()
            .filter(|&&i| items[i].kind != ItemKind::Dummy)
            .map(|&i| items[i].width)
            .max()
            .unwrap_or(1);
        let mut y = (tallest - extent(layer, items)) / 2;
        for &idx in layer {
            if items[idx].kind == ItemKind::Dummy {
                items[idx].width = column_width;
            }
            items[idx].x = x;
            items[idx].y = y;
            y += height(idx, items) + V_SPACING;
        }
        spans.push((x, column_width));
        x += column_width + gaps[layer_idx];
    }
    Columns { spans }
}

fn draw_horizontal(
    canvas: &mut Canvas,
    chart: &Flowchart,
    items: &[Item],
    segments: &[Segment],
    columns: &Columns,
) {
    for item in items.iter().filter(|i| i.kind == ItemKind::Dummy) {
        canvas.hline(item.y, item.x, item.x + item.width - 1, LineStyle::Light);
    }

    let mid = |item: &Item| match item.kind {
        ItemKind::Node(_) => item.y + 1,
        ItemKind::Dummy => item.y,
    };
    let reversed = chart.direction.is_reversed();

    let mut labels = Vec::new();
    for seg in segments {
        let edge = &chart.edges[seg.edge];
        let style = edge_line_style(edge.style);
        let (near, far) = (&items[seg.near], &items[seg.far]);
        let (yn, yf) = (mid(near), mid(far));
        let (col_x, col_w) = columns.spans[near.layer];
        let start = near.x + near.width;
        let end = far.x - 1;
        // Channel column sits on the source side of the gap, clear of every box.
        let channel = if reversed { end - 1 } else { col_x + col_w + 1 };
        let toward_far = targets_far(chart, items, seg);
        let arrow_near = edge.arrow && toward_far == Some(false);
        let arrow_far = edge.arrow && toward_far == Some(true);

        canvas.hline(yn, if arrow_near { start } else { start - 1 }, channel, style);
        canvas.vline(channel, yn, yf, style);
        canvas.hline(yf, channel, if arrow_far { end } else { end + 1 }, style);

        if arrow_far {
            canvas.glyph(end, yf, '▶');
        }
        if arrow_near {
            canvas.glyph(start, yn, '◀');
        }
        if let Some(label) = &edge.label {
            match toward_far {
                Some(true) => labels.push((channel + 2, yf, label.as_str())),
                Some(false) => labels.push((start + 2, yn, label.as_str())),
                None => {}
            }
        }
    }
    for (x, y, label) in labels {
        canvas.text(x, y, &format!(" {label} "));
    }
}

fn draw_node(canvas: &mut Canvas, item: &Item, label: &str, shape: NodeShape) {
    let (x, y, w) = (item.x, item.y, item.width);
    canvas.draw_box(x, y, w, BOX_HEIGHT);
    let right = x + w - 1;
    let bottom = y + BOX_HEIGHT - 1;

    match shape {
        NodeShape::Rect => {}
        NodeShape::Round | NodeShape::Circle | NodeShape::Cylinder => {
            canvas.glyph(x, y, '╭');
            canvas.glyph(right, y, '╮');
            canvas.glyph(x, bottom, '╰');
            canvas.glyph(right, bottom, '╯');
        }
        NodeShape::Diamond => {
            for (cx, cy) in [(x, y), (right, y), (x, bottom), (right, bottom)] {
                canvas.glyph(cx, cy, '◇');
            }
        }
        NodeShape::Flag => canvas.glyph(x, y + 1, '▷'),
    }

    let text = match shape {
        NodeShape::Circle => format!("( {label} )"),
        _ => label.to_string(),
    };
    canvas.text(x + 2, y + 1, &text);
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/diagram/layout.rs"]
mod tests;
