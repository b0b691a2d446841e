//! Interface between the merge engine and the document it edits

use crate::error::SceneResult;
use crate::id::{ImageHash, NodeId};
use crate::node::Node;

/// A mutable document tree
///
/// The merge engine never owns nodes. It reaches them through this trait by
/// id and only holds ids between calls.
pub trait SceneHost {
    /// Look up a node
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// Look up a node for editing
    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;

    /// Parent of a node, `None` for detached nodes and the document root
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    /// Deep-copy a subtree; the copy is detached and gets fresh ids
    fn clone_node(&mut self, id: NodeId) -> SceneResult<NodeId>;

    /// Move `child` under `parent`, appended after the existing children
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()>;

    /// Every descendant of `root` named `name`, in pre-order
    ///
    /// `root` itself is not included. Returns nothing when `root` cannot
    /// contain children.
    fn find_all_by_name(&self, root: NodeId, name: &str) -> Vec<NodeId>;

    /// Top-level component with exactly this name
    fn find_component_by_name(&self, name: &str) -> Option<NodeId>;

    /// Point an instance at a different main component
    fn swap_component(&mut self, instance: NodeId, component: NodeId) -> SceneResult<()>;

    /// Register image bytes and get the hash paints refer to them by
    fn create_image(&mut self, bytes: Vec<u8>) -> ImageHash;

    /// Replace the current selection
    fn set_selection(&mut self, ids: Vec<NodeId>);

    /// Bring nodes into view
    fn focus(&mut self, _ids: &[NodeId]) {}
}
