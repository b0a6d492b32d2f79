//! 本地文件系统文档存储
//!
//! 路径解析顺序：
//! - `docs/…` 直接位于根目录下
//! - 白名单根文件（README.md 等）位于根目录
//! - 其他路径先查 `docs/`，不存在时再查根目录

use crate::kernel::services::ports::store::{
    is_protected, DocCategory, DocEntry, DocumentStore, Result, StaticLookup, StoreError,
    ROOT_FILES,
};
use crate::models::DocPath;
use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DOCS_DIR: &str = "docs";

/// Root files included in listings.
const LISTED_ROOT_FILES: &[&str] = &["README.md", "CLAUDE.md", "CLAUDE_CODE_STATUS.md"];

#[derive(Debug, Clone)]
pub struct LocalDocStore {
    root: PathBuf,
}

impl LocalDocStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location for `path`; the file need not exist.
    pub fn resolve(&self, path: &DocPath) -> PathBuf {
        let rel = path.to_relative_path();
        if path.is_under(DOCS_DIR) || ROOT_FILES.contains(&path.as_str()) {
            return self.root.join(rel);
        }

        let in_docs = self.root.join(DOCS_DIR).join(&rel);
        if in_docs.exists() {
            return in_docs;
        }
        let at_root = self.root.join(&rel);
        if at_root.exists() {
            at_root
        } else {
            in_docs
        }
    }

    fn list_docs_dir(&self, out: &mut Vec<DocEntry>) -> Result<()> {
        let docs = self.root.join(DOCS_DIR);
        if !docs.is_dir() {
            return Ok(());
        }

        let walker = WalkBuilder::new(&docs)
            .hidden(true)
            .git_ignore(false)
            .parents(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable docs entry");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let file = entry.path();
            if file.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let Some(path) = self.logical_path(file) else {
                continue;
            };
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            out.push(DocEntry {
                name: path.file_name().to_string(),
                path,
                category: DocCategory::Docs,
                size,
            });
        }
        Ok(())
    }

    fn logical_path(&self, file: &Path) -> Option<DocPath> {
        let rel = file.strip_prefix(&self.root).ok()?;
        let joined = rel
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?
            .join("/");
        DocPath::parse(&joined).ok()
    }

    /// `resolve`, refusing locations that symlinks carry outside the root.
    fn resolve_contained(&self, path: &DocPath) -> Result<PathBuf> {
        let file = self.resolve(path);
        ensure_contained(&self.root, &file, path)?;
        Ok(file)
    }
}

/// Checks that `file`, or its nearest existing ancestor when it does not
/// exist yet, lies under `base` once symlinks are resolved.
fn ensure_contained(base: &Path, file: &Path, path: &DocPath) -> Result<()> {
    let Ok(base) = fs::canonicalize(base) else {
        // Missing base: nothing beneath it exists to point elsewhere.
        return Ok(());
    };
    let Some(existing) = file
        .ancestors()
        .find(|p| fs::symlink_metadata(p).is_ok())
    else {
        return Ok(());
    };
    match fs::canonicalize(existing) {
        Ok(real) if real.starts_with(&base) => Ok(()),
        Ok(real) => {
            tracing::warn!(path = %path, target = %real.display(), "path escapes store root");
            Err(StoreError::OutsideRoot(path.clone()))
        }
        // Dangling symlink.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(StoreError::OutsideRoot(path.clone()))
        }
        Err(e) => Err(StoreError::Io(e)),
    }
}

pub(super) fn read_document(file: &Path, path: &DocPath) -> Result<String> {
    match fs::metadata(file) {
        Ok(meta) if meta.is_file() => Ok(fs::read_to_string(file)?),
        Ok(_) => Err(StoreError::NotAFile(path.clone())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(path.clone())),
        Err(e) => Err(StoreError::Io(e)),
    }
}

impl DocumentStore for LocalDocStore {
    fn read(&self, path: &DocPath) -> Result<String> {
        read_document(&self.resolve_contained(path)?, path)
    }

    fn write(&self, path: &DocPath, text: &str) -> Result<()> {
        let file = self.resolve_contained(path)?;
        if file.is_dir() {
            return Err(StoreError::NotAFile(path.clone()));
        }
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, text)?;
        tracing::debug!(path = %path, file = %file.display(), "document written");
        Ok(())
    }

    fn list(&self) -> Result<Vec<DocEntry>> {
        let mut out = Vec::new();
        for name in LISTED_ROOT_FILES {
            let file = self.root.join(name);
            let Ok(meta) = fs::metadata(&file) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            out.push(DocEntry {
                path: DocPath::parse(name)?,
                name: name.to_string(),
                category: DocCategory::Root,
                size: meta.len(),
            });
        }
        self.list_docs_dir(&mut out)?;
        Ok(out)
    }

    fn delete(&self, path: &DocPath) -> Result<()> {
        let file = self.resolve_contained(path)?;
        if !file.exists() {
            return Err(StoreError::NotFound(path.clone()));
        }
        if is_protected(path) {
            return Err(StoreError::Protected(path.clone()));
        }
        if !file.is_file() {
            return Err(StoreError::NotAFile(path.clone()));
        }
        fs::remove_file(&file)?;
        Ok(())
    }
}

/// Static copy of the documents under a served directory (e.g. `public/`).
#[derive(Debug, Clone)]
pub struct LocalStaticLookup {
    dir: PathBuf,
}

impl LocalStaticLookup {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl StaticLookup for LocalStaticLookup {
    fn lookup(&self, path: &DocPath) -> Result<String> {
        let file = self.dir.join(path.to_relative_path());
        ensure_contained(&self.dir, &file, path)?;
        read_document(&file, path)
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/store/local.rs"]
mod tests;
