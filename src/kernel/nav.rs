//! 导航树的视图状态（展开/折叠、选中项）
//!
//! 每个使用导航树的组件各自持有一份 `NavState`；树本身不可变。

use crate::models::{DocPath, NavNodeId, NavTree};
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavRow {
    pub id: NavNodeId,
    pub depth: usize,
    pub is_branch: bool,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavActivation {
    Open(DocPath),
    Toggled,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct NavState {
    expanded: FxHashSet<NavNodeId>,
    selected: Option<NavNodeId>,
}

impl NavState {
    /// Expansion seeded from each branch's declared default.
    pub fn new(tree: &NavTree) -> Self {
        let expanded = tree
            .iter()
            .filter(|(_, node)| node.is_branch() && node.default_expanded())
            .map(|(id, _)| id)
            .collect();
        Self {
            expanded,
            selected: tree.roots().first().copied(),
        }
    }

    pub fn is_expanded(&self, id: NavNodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Flips one branch. Leaves and unknown ids are left alone.
    pub fn toggle(&mut self, tree: &NavTree, id: NavNodeId) -> bool {
        if !tree.get(id).is_some_and(|node| node.is_branch()) {
            return false;
        }
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
        true
    }

    pub fn is_active(&self, tree: &NavTree, id: NavNodeId, current: Option<&DocPath>) -> bool {
        tree.is_active(id, current)
    }

    /// Expands every ancestor of the leaf for `path` and selects it.
    pub fn reveal(&mut self, tree: &NavTree, path: &DocPath) -> bool {
        let Some(id) = tree.find_by_path(path) else {
            return false;
        };
        self.expanded.extend(tree.ancestors(id));
        self.selected = Some(id);
        true
    }

    /// Rows visible with the current expansion, depth-first.
    pub fn visible_rows(&self, tree: &NavTree) -> Vec<NavRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NavNodeId, usize)> =
            tree.roots().iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = tree.get(id) else {
                continue;
            };
            let expanded = self.is_expanded(id);
            rows.push(NavRow {
                id,
                depth,
                is_branch: node.is_branch(),
                expanded,
            });
            if expanded {
                stack.extend(node.children().iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        rows
    }

    pub fn selected(&self) -> Option<NavNodeId> {
        self.selected
    }

    pub fn select(&mut self, id: NavNodeId) {
        self.selected = Some(id);
    }

    pub fn select_next(&mut self, tree: &NavTree) {
        self.move_selection(tree, 1);
    }

    pub fn select_prev(&mut self, tree: &NavTree) {
        self.move_selection(tree, -1);
    }

    fn move_selection(&mut self, tree: &NavTree, delta: isize) {
        let rows = self.visible_rows(tree);
        if rows.is_empty() {
            self.selected = None;
            return;
        }
        let current = self
            .selected
            .and_then(|id| rows.iter().position(|row| row.id == id));
        let next = match current {
            Some(idx) => idx.saturating_add_signed(delta).min(rows.len() - 1),
            None => 0,
        };
        self.selected = Some(rows[next].id);
    }

    /// Opens the selected leaf or toggles the selected branch.
    pub fn activate_selected(&mut self, tree: &NavTree) -> NavActivation {
        let Some(id) = self.selected else {
            return NavActivation::None;
        };
        match tree.get(id).and_then(|node| node.path()) {
            Some(path) => NavActivation::Open(path.clone()),
            None if self.toggle(tree, id) => NavActivation::Toggled,
            None => NavActivation::None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/nav.rs"]
mod tests;
