//! Resolving element names inside a subtree

use datamerge_scene::{NodeId, SceneHost};

/// `root` if it is named `name`, followed by every matching descendant
///
/// Matching is exact and case-sensitive. Matches nested under other matches
/// are still found. Leaf roots are only compared against themselves.
pub fn find_by_name<H: SceneHost + ?Sized>(host: &H, root: NodeId, name: &str) -> Vec<NodeId> {
    let Some(node) = host.node(root) else {
        return Vec::new();
    };

    let mut found = Vec::new();
    if node.name == name {
        found.push(root);
    }
    if node.capabilities().children {
        found.extend(host.find_all_by_name(root, name));
    }
    found
}
