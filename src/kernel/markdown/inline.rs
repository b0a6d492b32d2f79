//! Inline markdown: emphasis, code spans, links, images, autolinks, escapes.
//!
//! Markers are hidden in the display text; each construct becomes a span over
//! the bytes it produced. A marker without a valid closing counterpart is kept
//! as literal text.

/// Display text plus style spans over it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InlineText {
    pub text: String,
    pub spans: Vec<InlineSpan>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineSpan {
    pub start: usize,
    pub end: usize,
    pub kind: InlineKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineKind {
    Bold,
    Italic,
    Strike,
    Code,
    Link,
    Image,
}

/// A link target attached to a display range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub start: usize,
    pub end: usize,
    pub target: String,
}

impl InlineText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn has_span(&self, kind: InlineKind) -> bool {
        self.spans.iter().any(|s| s.kind == kind)
    }

    fn push_span(&mut self, start: usize, kind: InlineKind) {
        let end = self.text.len();
        if end > start {
            self.spans.push(InlineSpan { start, end, kind });
        }
    }
}

/// Parses one logical line (or a space-joined paragraph) of inline markdown.
pub fn parse_inline(src: &str) -> InlineText {
    let mut out = InlineText {
        text: String::with_capacity(src.len()),
        ..InlineText::default()
    };
    parse_into(src, &mut out, 0);
    out
}

const MAX_NESTING: usize = 8;

fn parse_into(src: &str, out: &mut InlineText, depth: usize) {
    if depth > MAX_NESTING {
        out.text.push_str(src);
        return;
    }

    let bytes = src.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        let b = bytes[i];

        if b == b'\\' && i + 1 < len && bytes[i + 1].is_ascii_punctuation() {
            out.text.push(bytes[i + 1] as char);
            i += 2;
            continue;
        }

        if (b == b'*' || b == b'_') && i + 1 < len && bytes[i + 1] == b {
            let marker = if b == b'*' { "**" } else { "__" };
            if opens_emphasis(src, i, 2) {
                if let Some((content, end)) = find_closing(src, i + 2, marker) {
                    if closes_emphasis(src, end - 2, 2) {
                        let start = out.text.len();
                        parse_into(content, out, depth + 1);
                        out.push_span(start, InlineKind::Bold);
                        i = end;
                        continue;
                    }
                }
            }
        }

        if (b == b'*' || b == b'_') && (i + 1 >= len || bytes[i + 1] != b) {
            if opens_emphasis(src, i, 1) {
                if let Some((content, end)) = find_closing_single(src, i + 1, b) {
                    if closes_emphasis(src, end - 1, 1) {
                        let start = out.text.len();
                        parse_into(content, out, depth + 1);
                        out.push_span(start, InlineKind::Italic);
                        i = end;
                        continue;
                    }
                }
            }
        }

        if b == b'~' && i + 1 < len && bytes[i + 1] == b'~' {
            if let Some((content, end)) = find_closing(src, i + 2, "~~") {
                let start = out.text.len();
                parse_into(content, out, depth + 1);
                out.push_span(start, InlineKind::Strike);
                i = end;
                continue;
            }
        }

        if b == b'`' {
            if let Some((content, end)) = parse_code_span(src, i) {
                let start = out.text.len();
                out.text.push_str(content);
                out.push_span(start, InlineKind::Code);
                i = end;
                continue;
            }
            // An unmatched backtick run is literal as a whole.
            let run = bytes[i..].iter().take_while(|&&c| c == b'`').count();
            out.text.push_str(&src[i..i + run]);
            i += run;
            continue;
        }

        if b == b'!' && bytes.get(i + 1) == Some(&b'[') {
            if let Some(link) = parse_link(src, i + 1) {
                let start = out.text.len();
                out.text.push_str(&src[link.text.0..link.text.1]);
                out.push_span(start, InlineKind::Image);
                out.links.push(Link {
                    start,
                    end: out.text.len(),
                    target: link_target(&src[link.url.0..link.url.1]),
                });
                i = link.end;
                continue;
            }
        }

        if b == b'[' {
            if let Some(link) = parse_link(src, i) {
                let start = out.text.len();
                parse_into(&src[link.text.0..link.text.1], out, depth + 1);
                out.push_span(start, InlineKind::Link);
                out.links.push(Link {
                    start,
                    end: out.text.len(),
                    target: link_target(&src[link.url.0..link.url.1]),
                });
                i = link.end;
                continue;
            }
        }

        if b == b'<' {
            if let Some((target, end)) = parse_autolink(src, i) {
                let start = out.text.len();
                out.text.push_str(target);
                out.push_span(start, InlineKind::Link);
                out.links.push(Link {
                    start,
                    end: out.text.len(),
                    target: target.to_string(),
                });
                i = end;
                continue;
            }
        }

        let ch_len = src[i..].chars().next().map_or(1, char::len_utf8);
        out.text.push_str(&src[i..i + ch_len]);
        i += ch_len;
    }
}

fn char_before(src: &str, idx: usize) -> Option<char> {
    src[..idx].chars().next_back()
}

fn char_after(src: &str, idx: usize) -> Option<char> {
    src.get(idx..)?.chars().next()
}

/// Opening run must be followed by non-whitespace; `_` must not sit inside a word.
fn opens_emphasis(src: &str, idx: usize, run: usize) -> bool {
    let Some(next) = char_after(src, idx + run) else {
        return false;
    };
    if next.is_whitespace() {
        return false;
    }
    if src.as_bytes()[idx] == b'_' {
        return !char_before(src, idx).is_some_and(char::is_alphanumeric);
    }
    true
}

/// Closing run must follow non-whitespace; `_` must not be followed by a word char.
fn closes_emphasis(src: &str, idx: usize, run: usize) -> bool {
    if char_before(src, idx).map_or(true, char::is_whitespace) {
        return false;
    }
    if src.as_bytes()[idx] == b'_' {
        return !char_after(src, idx + run).is_some_and(char::is_alphanumeric);
    }
    true
}

fn find_closing<'a>(src: &'a str, start: usize, marker: &str) -> Option<(&'a str, usize)> {
    let rest = src.get(start..)?;
    let pos = rest.find(marker)?;
    if pos == 0 {
        return None;
    }
    Some((&rest[..pos], start + pos + marker.len()))
}

fn find_closing_single(src: &str, start: usize, marker: u8) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    let mut j = start;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'`' => {
                // Markers inside code spans never close emphasis.
                match parse_code_span(src, j) {
                    Some((_, end)) => j = end,
                    None => j += 1,
                }
            }
            c if c == marker => {
                let doubled = bytes.get(j + 1) == Some(&marker);
                if doubled {
                    j += 2;
                    continue;
                }
                if j == start {
                    return None;
                }
                return Some((&src[start..j], j + 1));
            }
            _ => j += 1,
        }
    }
    None
}

/// Code span with any backtick run length; one surrounding space is stripped
/// when the content is padded on both sides.
fn parse_code_span(src: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = src.as_bytes();
    if bytes.get(start).copied() != Some(b'`') {
        return None;
    }

    let mut marker_len = 0;
    while start + marker_len < bytes.len() && bytes[start + marker_len] == b'`' {
        marker_len += 1;
    }

    let content_start = start + marker_len;
    let mut i = content_start;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let mut run_len = 0;
        while i + run_len < bytes.len() && bytes[i + run_len] == b'`' {
            run_len += 1;
        }
        if run_len == marker_len {
            if i == content_start {
                return None;
            }
            let mut content = &src[content_start..i];
            if content.len() >= 2
                && content.starts_with(' ')
                && content.ends_with(' ')
                && !content.trim().is_empty()
            {
                content = &content[1..content.len() - 1];
            }
            return Some((content, i + marker_len));
        }
        i += run_len;
    }

    None
}

struct LinkParts {
    text: (usize, usize),
    url: (usize, usize),
    end: usize,
}

fn parse_link(src: &str, start: usize) -> Option<LinkParts> {
    let bytes = src.as_bytes();
    if bytes.get(start).copied() != Some(b'[') {
        return None;
    }

    let mut text_end = None;
    let mut depth = 0usize;
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' => {
                depth += 1;
                i += 1;
            }
            b']' => {
                if depth == 0 {
                    text_end = Some(i);
                    break;
                }
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }

    let text_end = text_end?;
    if text_end == start + 1 || bytes.get(text_end + 1).copied() != Some(b'(') {
        return None;
    }

    let url_start = text_end + 2;
    let mut paren_depth = 0usize;
    let mut j = url_start;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'(' => {
                paren_depth += 1;
                j += 1;
            }
            b')' => {
                if paren_depth == 0 {
                    return Some(LinkParts {
                        text: (start + 1, text_end),
                        url: (url_start, j),
                        end: j + 1,
                    });
                }
                paren_depth -= 1;
                j += 1;
            }
            _ => j += 1,
        }
    }

    None
}

/// Drops an optional `"title"` and angle brackets from a link destination.
fn link_target(raw: &str) -> String {
    let dest = raw.split_whitespace().next().unwrap_or_default();
    dest.strip_prefix('<')
        .and_then(|d| d.strip_suffix('>'))
        .unwrap_or(dest)
        .to_string()
}

fn parse_autolink(src: &str, start: usize) -> Option<(&str, usize)> {
    let rest = src.get(start + 1..)?;
    let close = rest.find('>')?;
    let inner = &rest[..close];
    if inner.is_empty() || inner.chars().any(|c| c.is_whitespace() || c == '<') {
        return None;
    }
    let is_url = inner
        .split_once("://")
        .is_some_and(|(scheme, tail)| {
            !scheme.is_empty()
                && !tail.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        });
    let is_mail = inner.starts_with("mailto:") && inner.len() > "mailto:".len();
    if !is_url && !is_mail {
        return None;
    }
    Some((inner, start + 1 + close + 1))
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/markdown/inline.rs"]
mod tests;
