use crate::layout::{hit_test, LayoutRect};
use crate::scanner::ScanRequest;
use crate::tree::TreeNode;
use crate::ui::navigation::ZoomNavigator;

/// How a rectangle was activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Single click: zoom into a directory
    Single,
    /// Double click: re-root with a fresh scan
    Double,
}

/// Input action produced from an activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// The focused subtree changed; redraw from `ZoomNavigator::focused`
    Zoomed,
    /// Start a new scan; the caller calls `ZoomNavigator::on_scan_complete`
    /// once its tree arrives
    Rescan(ScanRequest),
    /// No action
    None,
}

/// Resolve a click at `(x, y)` on the current frame.
pub fn activate(
    rects: &[LayoutRect<&TreeNode>],
    x: f64,
    y: f64,
    activation: Activation,
    tree: &TreeNode,
    navigator: &mut ZoomNavigator,
    current: &ScanRequest,
) -> InputAction {
    let Some(rect) = hit_test(rects, x, y) else {
        return InputAction::None;
    };
    let node = rect.item;

    match activation {
        Activation::Double => InputAction::Rescan(ZoomNavigator::open(node, current)),
        Activation::Single if node.is_dir => {
            if navigator.zoom_into(tree, &node.path) {
                InputAction::Zoomed
            } else {
                InputAction::None
            }
        }
        Activation::Single => InputAction::None,
    }
}
