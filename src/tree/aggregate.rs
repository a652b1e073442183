use super::TreeNode;

/// Sort siblings by size (descending). Stable, so equal sizes keep
/// discovery order. The squarified layout expects this order.
pub fn sort_children_by_size(children: &mut [TreeNode]) {
    children.sort_by(|a, b| b.size.cmp(&a.size));
}

/// Whether every directory's children are sorted largest first.
pub fn is_size_sorted(root: &TreeNode) -> bool {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.children.windows(2).any(|w| w[0].size < w[1].size) {
            return false;
        }
        stack.extend(node.children.iter());
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn ties_keep_discovery_order() {
        let mut children = vec![
            TreeNode::leaf(Path::new("/d/first"), 10),
            TreeNode::leaf(Path::new("/d/big"), 99),
            TreeNode::leaf(Path::new("/d/second"), 10),
            TreeNode::leaf(Path::new("/d/third"), 10),
        ];
        sort_children_by_size(&mut children);
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["big", "first", "second", "third"]);
    }

    #[test]
    fn detects_unsorted_children() {
        let root = TreeNode {
            path: "/d".into(),
            name: "d".into(),
            size: 3,
            is_dir: true,
            children: vec![
                TreeNode::leaf(Path::new("/d/a"), 1),
                TreeNode::leaf(Path::new("/d/b"), 2),
            ],
        };
        assert!(!is_size_sorted(&root));
    }
}
