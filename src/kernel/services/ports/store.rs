//! 文档存储端口
//!
//! 以逻辑路径寻址的读写服务；具体传输（本地文件、内存）由 adapters 提供。

use crate::models::{DocPath, DocPathError};
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Root-level documents served from the store root rather than `docs/`.
pub const ROOT_FILES: &[&str] = &[
    "README.md",
    "CLAUDE.md",
    "CLAUDE_CODE_STATUS.md",
    "CLAUDE_CODE_INSTRUCTIONS.md",
];

/// Documents that `delete` refuses to remove.
pub const PROTECTED_FILES: &[&str] = &[
    "README.md",
    "CLAUDE.md",
    "CLAUDE_CODE_STATUS.md",
    "AUTHENTICATION.md",
    "AUTH_FLOWS.md",
];

pub fn is_protected(path: &DocPath) -> bool {
    PROTECTED_FILES.contains(&path.file_name())
}

#[derive(Debug)]
pub enum StoreError {
    NotFound(DocPath),
    NotAFile(DocPath),
    Protected(DocPath),
    OutsideRoot(DocPath),
    InvalidPath(DocPathError),
    Unavailable(String),
    Io(io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(p) => write!(f, "Document not found: {}", p),
            StoreError::NotAFile(p) => write!(f, "Not a file: {}", p),
            StoreError::Protected(p) => write!(f, "Cannot delete protected file: {}", p),
            StoreError::OutsideRoot(p) => write!(f, "Path leaves the document root: {}", p),
            StoreError::InvalidPath(e) => write!(f, "Invalid path: {}", e),
            StoreError::Unavailable(s) => write!(f, "Store unavailable: {}", s),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::InvalidPath(e) => Some(e),
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<DocPathError> for StoreError {
    fn from(e: DocPathError) -> Self {
        StoreError::InvalidPath(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocCategory {
    Root,
    Docs,
}

impl DocCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            DocCategory::Root => "root",
            DocCategory::Docs => "docs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocEntry {
    pub path: DocPath,
    pub name: String,
    pub category: DocCategory,
    pub size: u64,
}

/// Path-addressed document store.
pub trait DocumentStore: Send + Sync {
    fn read(&self, path: &DocPath) -> Result<String>;

    /// Creates missing parent directories.
    fn write(&self, path: &DocPath, text: &str) -> Result<()>;

    fn list(&self) -> Result<Vec<DocEntry>>;

    fn delete(&self, path: &DocPath) -> Result<()>;
}

/// Read-only copy of the documents served as static assets.
pub trait StaticLookup: Send + Sync {
    fn lookup(&self, path: &DocPath) -> Result<String>;
}
