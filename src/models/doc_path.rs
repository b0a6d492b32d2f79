//! 文档逻辑路径
//!
//! 逻辑路径与存储无关：`docs/quick-start.md`、`README.md`。
//! 构造时完成规范化（去掉前导 `/`，补全 `.md`），并拒绝任何可能逃出存储根目录的片段。

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocPathError {
    Empty,
    InvalidSegment(String),
    InvalidChar(char),
}

impl fmt::Display for DocPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocPathError::Empty => write!(f, "document path is empty"),
            DocPathError::InvalidSegment(seg) => {
                write!(f, "invalid path segment: {:?}", seg)
            }
            DocPathError::InvalidChar(ch) => write!(f, "invalid character in path: {:?}", ch),
        }
    }
}

impl std::error::Error for DocPathError {}

impl DocPath {
    pub fn parse(raw: &str) -> Result<Self, DocPathError> {
        let trimmed = raw.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(DocPathError::Empty);
        }
        if let Some(ch) = trimmed.chars().find(|&c| c == '\\' || c == '\0') {
            return Err(DocPathError::InvalidChar(ch));
        }
        if let Some(seg) = trimmed
            .split('/')
            .find(|seg| seg.is_empty() || *seg == "." || *seg == "..")
        {
            return Err(DocPathError::InvalidSegment(seg.to_string()));
        }

        let mut path = trimmed.to_string();
        if !path.ends_with(".md") {
            path.push_str(".md");
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Parent directory segments joined by `/`, empty for root documents.
    pub fn parent(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(parent, _)| parent)
    }

    pub fn is_root_file(&self) -> bool {
        !self.0.contains('/')
    }

    pub fn is_under(&self, dir: &str) -> bool {
        let dir = dir.trim_matches('/');
        self.0
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Strips a leading directory, e.g. `docs/a/b.md` under `docs` → `a/b.md`.
    pub fn strip_dir(&self, dir: &str) -> Option<&str> {
        let dir = dir.trim_matches('/');
        self.0.strip_prefix(dir)?.strip_prefix('/')
    }

    /// Human readable title derived from the file name: `quick-start.md` → `Quick start`.
    pub fn title(&self) -> String {
        let stem = self.file_name().trim_end_matches(".md");
        let spaced = stem.replace(['-', '_'], " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Relative filesystem path built from the segments.
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments().collect()
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocPath {
    type Err = DocPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for DocPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/doc_path.rs"]
mod tests;
