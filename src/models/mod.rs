//! 数据模型层

pub mod doc_path;
pub mod draft;
pub mod nav_tree;

pub use doc_path::{DocPath, DocPathError};
pub use draft::DraftBuffer;
pub use nav_tree::{NavKind, NavNode, NavNodeId, NavSpec, NavTree, NavTreeError, DEFAULT_NAV};
