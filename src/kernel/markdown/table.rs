//! GFM pipe tables: cell splitting and alignment rows.

use super::TableAlign;

/// Splits a table row into trimmed cell sources.
///
/// Escaped pipes (`\|`) stay inside their cell. Leading and trailing pipes are
/// optional. Returns `None` for lines without any unescaped pipe.
pub(super) fn split_cells(src: &str) -> Option<Vec<&str>> {
    let src = src.trim();
    let bytes = src.as_bytes();
    let mut separators = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'|' => separators.push(i),
            _ => {}
        }
        i += 1;
    }
    if separators.is_empty() {
        return None;
    }

    let mut segments = Vec::with_capacity(separators.len() + 1);
    let mut start = 0usize;
    for sep in separators {
        segments.push((start, sep));
        start = sep + 1;
    }
    segments.push((start, src.len()));

    if src.starts_with('|') {
        segments.remove(0);
    }
    if src.ends_with('|') && !src.ends_with("\\|") {
        segments.pop();
    }
    if segments.is_empty() {
        return None;
    }

    Some(
        segments
            .into_iter()
            .map(|(s, e)| src[s..e].trim())
            .collect(),
    )
}

pub(super) fn parse_alignment(cell: &str) -> Option<TableAlign> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    let left = trimmed.starts_with(':');
    let right = trimmed.len() > 1 && trimmed.ends_with(':');
    let core = trimmed.trim_matches(':');
    if core.len() < 3 || !core.chars().all(|ch| ch == '-') {
        return None;
    }

    Some(match (left, right) {
        (false, false) => TableAlign::None,
        (true, false) => TableAlign::Left,
        (false, true) => TableAlign::Right,
        (true, true) => TableAlign::Center,
    })
}

/// Alignments when `header` / `separator` open a table with matching column counts.
pub(super) fn detect_header(header: &str, separator: &str) -> Option<Vec<TableAlign>> {
    let header = split_cells(header)?;
    let separator = split_cells(separator)?;
    if header.is_empty() || header.len() != separator.len() {
        return None;
    }
    separator.iter().map(|cell| parse_alignment(cell)).collect()
}
