use std::path::Path;

use crate::scanner::ScanRequest;
use crate::tree::TreeNode;

/// Zoom state over one scanned tree: which subtree is displayed, plus the
/// history needed to step back out. Nodes are addressed by their child-index
/// route from the root, so the navigator never borrows the tree it walks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ZoomNavigator {
    /// Route to the focused node; `None` shows the scan root
    focused: Option<Vec<usize>>,
    history: Vec<Option<Vec<usize>>>,
}

impl ZoomNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus the directory at `target`, which must already be in `tree`.
    /// Returns true if navigation happened.
    pub fn zoom_into(&mut self, tree: &TreeNode, target: &Path) -> bool {
        let Some(route) = tree.route_to(target) else {
            return false;
        };
        match tree.at(&route) {
            Some(node) if node.is_dir => {}
            _ => return false,
        }

        let next = if route.is_empty() { None } else { Some(route) };
        if next == self.focused {
            return false;
        }
        self.history.push(self.focused.take());
        self.focused = next;
        true
    }

    /// Step back to the previously focused node.
    /// Returns true if navigation happened.
    pub fn zoom_out(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.focused = prev;
                true
            }
            None => false,
        }
    }

    /// Back to the scan root.
    pub fn reset(&mut self) {
        self.history.clear();
        self.focused = None;
    }

    /// The node to display. Falls back to the root if the route no longer
    /// resolves in `tree`.
    pub fn focused<'t>(&self, tree: &'t TreeNode) -> &'t TreeNode {
        self.focused
            .as_deref()
            .and_then(|route| tree.at(route))
            .unwrap_or(tree)
    }

    pub fn is_zoomed(&self) -> bool {
        self.focused.is_some()
    }

    /// Current depth in navigation history.
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Request for a fresh scan rooted at `node`, keeping the limits of the
    /// scan that produced the current tree.
    pub fn open(node: &TreeNode, current: &ScanRequest) -> ScanRequest {
        current.rerooted(&node.path)
    }

    /// A new tree replaced the old one; routes into it are meaningless now.
    pub fn on_scan_complete(&mut self) {
        self.reset();
    }
}
