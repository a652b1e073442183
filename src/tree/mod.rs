pub mod aggregate;

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::Serialize;

/// A node of a finished scan.
///
/// For directories `size` is the true total of every file found underneath,
/// even those that never made it into `children` (entry budget or size
/// filter). `children` is sorted by size, largest first, ties in discovery
/// order. Files never have children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub path: PathBuf,
    pub name: CompactString,
    pub size: u64,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

/// Display name for a path: its last component, or the whole path for roots.
pub(crate) fn display_name(path: &Path) -> CompactString {
    match path.file_name() {
        Some(name) => CompactString::new(name.to_string_lossy()),
        None => CompactString::new(path.to_string_lossy()),
    }
}

impl TreeNode {
    /// A file, or anything that is not a readable directory.
    pub fn leaf(path: &Path, size: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            name: display_name(path),
            size,
            is_dir: false,
            children: Vec::new(),
        }
    }

    /// A closed directory with its aggregated total and kept children.
    pub fn directory(path: &Path, size: u64, mut children: Vec<TreeNode>) -> Self {
        aggregate::sort_children_by_size(&mut children);
        Self {
            path: path.to_path_buf(),
            name: display_name(path),
            size,
            is_dir: true,
            children,
        }
    }

    /// Number of nodes appearing in `children` lists anywhere below this node.
    pub fn materialized_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += node.children.len();
            stack.extend(node.children.iter());
        }
        count
    }

    /// Child indices leading from this node to the node at `target`.
    /// Empty when `target` is this node itself.
    pub fn route_to(&self, target: &Path) -> Option<Vec<usize>> {
        let mut route = Vec::new();
        let mut current = self;
        while current.path != target {
            let (index, next) = current
                .children
                .iter()
                .enumerate()
                .find(|(_, child)| target.starts_with(&child.path))?;
            route.push(index);
            current = next;
        }
        Some(route)
    }

    /// Follow a route produced by [`TreeNode::route_to`].
    pub fn at(&self, route: &[usize]) -> Option<&TreeNode> {
        route
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn find(&self, target: &Path) -> Option<&TreeNode> {
        self.route_to(target).and_then(|route| self.at(&route))
    }

    /// Every materialized directory, this one included, largest first.
    pub fn folders(&self) -> Vec<&TreeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_dir {
                out.push(node);
            }
            // Reverse so the pre-order visit matches the children order.
            stack.extend(node.children.iter().rev());
        }
        out.sort_by(|a, b| b.size.cmp(&a.size));
        out
    }

    /// Direct children with their size relative to the largest sibling.
    pub fn top_level(&self) -> Vec<TopLevelEntry<'_>> {
        let max = self
            .children
            .first()
            .map(|c| c.size)
            .filter(|&s| s > 0)
            .unwrap_or(1) as f64;
        self.children
            .iter()
            .map(|node| TopLevelEntry {
                node,
                fraction: (node.size as f64 / max).clamp(0.0, 1.0),
            })
            .collect()
    }
}

/// One row of the top-level listing.
#[derive(Debug, Clone, Copy)]
pub struct TopLevelEntry<'a> {
    pub node: &'a TreeNode,
    /// Share of the largest sibling, in `[0, 1]`
    pub fraction: f64,
}
