pub mod squarify;

use serde::Serialize;

pub use self::squarify::{squarify, LayoutRect, Weighted};
use crate::tree::TreeNode;

/// Which siblings a treemap frame shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    #[default]
    Files,
    Directories,
}

/// Configuration for treemap layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreemapConfig {
    /// Largest number of rectangles in one frame (at least 1)
    pub max_items: usize,
    /// Preferred sibling kind; the other kind is used when this one is empty
    pub kind: ItemKind,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        Self {
            max_items: 300,
            kind: ItemKind::Files,
        }
    }
}

/// Pick the children of `node` that a treemap frame shows: the largest
/// non-empty siblings of the configured kind, falling back to the other kind
/// when the preferred one has nothing to draw.
pub fn select_items<'t>(node: &'t TreeNode, config: &TreemapConfig) -> Vec<&'t TreeNode> {
    let of_kind = |dirs: bool| -> Vec<&'t TreeNode> {
        node.children
            .iter()
            .filter(|c| c.is_dir == dirs && c.size > 0)
            .collect()
    };

    let prefer_dirs = config.kind == ItemKind::Directories;
    let mut items = of_kind(prefer_dirs);
    if items.is_empty() {
        items = of_kind(!prefer_dirs);
    }
    items.sort_by(|a, b| b.size.cmp(&a.size));
    items.truncate(config.max_items.max(1));
    items
}

/// Lay out one frame for `node` inside a `width` x `height` viewport.
pub fn compute_layout<'t>(
    node: &'t TreeNode,
    width: f64,
    height: f64,
    config: &TreemapConfig,
) -> Vec<LayoutRect<&'t TreeNode>> {
    let items: Vec<Weighted<&TreeNode>> = select_items(node, config)
        .into_iter()
        .map(|item| Weighted {
            item,
            weight: item.size,
        })
        .collect();

    tracing::debug!(
        "Laying out {} of {} children of '{}' in {:.0}x{:.0}",
        items.len(),
        node.children.len(),
        node.name,
        width,
        height
    );
    squarify(&items, 0.0, 0.0, width, height)
}

/// Hit-test: find which layout rectangle contains the given point.
pub fn hit_test<T>(rects: &[LayoutRect<T>], x: f64, y: f64) -> Option<&LayoutRect<T>> {
    rects.iter().find(|r| r.contains(x, y))
}
