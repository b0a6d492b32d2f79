//! 导航树数据模型
//!
//! 编译期内置的静态层级：叶子节点指向文档路径，分支节点持有有序子节点。
//! 树在构造后不可变；展开/折叠属于视图状态，见 `kernel::nav::NavState`。

use super::doc_path::{DocPath, DocPathError};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! { pub struct NavNodeId; }

/// Static description of one navigation entry.
#[derive(Debug, Clone, Copy)]
pub enum NavSpec {
    Leaf {
        id: &'static str,
        title: &'static str,
        path: &'static str,
        icon: Option<&'static str>,
    },
    Branch {
        id: &'static str,
        title: &'static str,
        icon: Option<&'static str>,
        expanded: bool,
        children: &'static [NavSpec],
    },
}

impl NavSpec {
    fn id(&self) -> &'static str {
        match self {
            NavSpec::Leaf { id, .. } | NavSpec::Branch { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavKind {
    Leaf { path: DocPath },
    Branch { children: Vec<NavNodeId> },
}

#[derive(Debug, Clone)]
pub struct NavNode {
    key: String,
    title: String,
    icon: Option<String>,
    parent: Option<NavNodeId>,
    default_expanded: bool,
    kind: NavKind,
}

impl NavNode {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn parent(&self) -> Option<NavNodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NavKind {
        &self.kind
    }

    pub fn path(&self) -> Option<&DocPath> {
        match &self.kind {
            NavKind::Leaf { path } => Some(path),
            NavKind::Branch { .. } => None,
        }
    }

    pub fn children(&self) -> &[NavNodeId] {
        match &self.kind {
            NavKind::Leaf { .. } => &[],
            NavKind::Branch { children } => children,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, NavKind::Branch { .. })
    }

    pub fn default_expanded(&self) -> bool {
        self.default_expanded
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavTreeError {
    DuplicateId(String),
    InvalidPath { id: String, error: DocPathError },
}

impl fmt::Display for NavTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavTreeError::DuplicateId(id) => write!(f, "duplicate navigation id: {}", id),
            NavTreeError::InvalidPath { id, error } => {
                write!(f, "navigation node {} has an invalid path: {}", id, error)
            }
        }
    }
}

impl std::error::Error for NavTreeError {}

#[derive(Debug, Clone, Default)]
pub struct NavTree {
    arena: SlotMap<NavNodeId, NavNode>,
    roots: Vec<NavNodeId>,
    by_key: FxHashMap<String, NavNodeId>,
    by_path: FxHashMap<DocPath, NavNodeId>,
}

impl NavTree {
    pub fn from_spec(spec: &[NavSpec]) -> Result<Self, NavTreeError> {
        let mut tree = Self::default();
        let mut roots = Vec::with_capacity(spec.len());
        for entry in spec {
            roots.push(tree.insert(entry, None)?);
        }
        tree.roots = roots;
        Ok(tree)
    }

    /// The compiled-in documentation tree.
    pub fn default_docs() -> Self {
        Self::from_spec(DEFAULT_NAV).unwrap_or_else(|e| {
            tracing::error!(error = %e, "built-in navigation tree is invalid");
            Self::default()
        })
    }

    fn insert(
        &mut self,
        spec: &NavSpec,
        parent: Option<NavNodeId>,
    ) -> Result<NavNodeId, NavTreeError> {
        let key = spec.id();
        if self.by_key.contains_key(key) {
            return Err(NavTreeError::DuplicateId(key.to_string()));
        }

        let id = match spec {
            NavSpec::Leaf {
                title, path, icon, ..
            } => {
                let path = DocPath::parse(path).map_err(|error| NavTreeError::InvalidPath {
                    id: key.to_string(),
                    error,
                })?;
                let id = self.arena.insert(NavNode {
                    key: key.to_string(),
                    title: title.to_string(),
                    icon: icon.map(str::to_string),
                    parent,
                    default_expanded: false,
                    kind: NavKind::Leaf { path: path.clone() },
                });
                self.by_path.entry(path).or_insert(id);
                id
            }
            NavSpec::Branch {
                title,
                icon,
                expanded,
                children,
                ..
            } => {
                let id = self.arena.insert(NavNode {
                    key: key.to_string(),
                    title: title.to_string(),
                    icon: icon.map(str::to_string),
                    parent,
                    default_expanded: *expanded,
                    kind: NavKind::Branch {
                        children: Vec::new(),
                    },
                });
                self.by_key.insert(key.to_string(), id);

                let mut child_ids = Vec::with_capacity(children.len());
                for child in children.iter() {
                    child_ids.push(self.insert(child, Some(id))?);
                }
                if let Some(node) = self.arena.get_mut(id) {
                    node.kind = NavKind::Branch {
                        children: child_ids,
                    };
                }
                return Ok(id);
            }
        };
        self.by_key.insert(key.to_string(), id);
        Ok(id)
    }

    pub fn roots(&self) -> &[NavNodeId] {
        &self.roots
    }

    pub fn get(&self, id: NavNodeId) -> Option<&NavNode> {
        self.arena.get(id)
    }

    pub fn find(&self, key: &str) -> Option<NavNodeId> {
        self.by_key.get(key).copied()
    }

    pub fn find_by_path(&self, path: &DocPath) -> Option<NavNodeId> {
        self.by_path.get(path).copied()
    }

    pub fn children(&self, id: NavNodeId) -> &[NavNodeId] {
        self.arena.get(id).map(NavNode::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NavNodeId) -> Option<NavNodeId> {
        self.arena.get(id).and_then(NavNode::parent)
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self, id: NavNodeId) -> Vec<NavNodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// Title for a document path, falling back to one derived from the file name.
    pub fn title_for(&self, path: &DocPath) -> String {
        self.find_by_path(path)
            .and_then(|id| self.get(id))
            .map(|node| node.title().to_string())
            .unwrap_or_else(|| path.title())
    }

    /// True when `id` is a leaf pointing at `current`.
    pub fn is_active(&self, id: NavNodeId, current: Option<&DocPath>) -> bool {
        match (self.get(id).and_then(NavNode::path), current) {
            (Some(path), Some(current)) => path == current,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Depth-first, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (NavNodeId, &NavNode)> + '_ {
        let mut stack: Vec<NavNodeId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = self.arena.get(id)?;
            stack.extend(node.children().iter().rev().copied());
            Some((id, node))
        })
    }
}

pub const DEFAULT_NAV: &[NavSpec] = &[
    NavSpec::Branch {
        id: "getting-started",
        title: "Getting Started",
        icon: Some("🚀"),
        expanded: true,
        children: &[
            NavSpec::Leaf {
                id: "overview",
                title: "Overview",
                path: "README.md",
                icon: Some("📖"),
            },
            NavSpec::Leaf {
                id: "quick-start",
                title: "Quick Start",
                path: "docs/quick-start.md",
                icon: Some("⚡"),
            },
            NavSpec::Leaf {
                id: "installation",
                title: "Installation",
                path: "docs/installation.md",
                icon: None,
            },
            NavSpec::Leaf {
                id: "configuration",
                title: "Configuration",
                path: "docs/configuration.md",
                icon: None,
            },
        ],
    },
    NavSpec::Branch {
        id: "guides",
        title: "Guides",
        icon: Some("🧭"),
        expanded: true,
        children: &[
            NavSpec::Leaf {
                id: "writing-docs",
                title: "Writing Documents",
                path: "docs/guides/writing.md",
                icon: None,
            },
            NavSpec::Leaf {
                id: "editing",
                title: "Editing & Preview",
                path: "docs/guides/editing.md",
                icon: None,
            },
            NavSpec::Leaf {
                id: "diagrams",
                title: "Diagrams",
                path: "docs/guides/diagrams.md",
                icon: None,
            },
        ],
    },
    NavSpec::Branch {
        id: "reference",
        title: "Reference",
        icon: Some("📚"),
        expanded: false,
        children: &[
            NavSpec::Leaf {
                id: "architecture",
                title: "Architecture",
                path: "docs/architecture.md",
                icon: None,
            },
            NavSpec::Leaf {
                id: "api",
                title: "Document API",
                path: "docs/reference/api.md",
                icon: None,
            },
            NavSpec::Branch {
                id: "internals",
                title: "Internals",
                icon: None,
                expanded: false,
                children: &[
                    NavSpec::Leaf {
                        id: "markdown-renderer",
                        title: "Markdown Renderer",
                        path: "docs/reference/markdown-renderer.md",
                        icon: None,
                    },
                    NavSpec::Leaf {
                        id: "diagram-renderer",
                        title: "Diagram Renderer",
                        path: "docs/reference/diagram-renderer.md",
                        icon: None,
                    },
                ],
            },
        ],
    },
    NavSpec::Branch {
        id: "project",
        title: "Project",
        icon: Some("🗂"),
        expanded: false,
        children: &[
            NavSpec::Leaf {
                id: "contributing",
                title: "Contributing",
                path: "docs/contributing.md",
                icon: None,
            },
            NavSpec::Leaf {
                id: "changelog",
                title: "Changelog",
                path: "docs/changelog.md",
                icon: None,
            },
        ],
    },
];

#[cfg(test)]
#[path = "../../tests/unit/models/nav_tree.rs"]
mod tests;
