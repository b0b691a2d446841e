//! In-memory document host
//!
//! [`Document`] keeps every node in one id-keyed map. Nodes created by
//! [`SceneHost::clone_node`] stay in the map while detached, so they can be
//! edited before or after they are appended to a parent.

use crate::error::{SceneError, SceneResult};
use crate::host::SceneHost;
use crate::id::{IdGenerator, ImageHash, NodeId};
use crate::node::{Node, NodeKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// On-disk form of a document
#[derive(Serialize, Deserialize)]
struct DocumentFile {
    root: NodeId,
    nodes: Vec<Node>,
    #[serde(default)]
    selection: Vec<NodeId>,
}

/// A single-page document tree
#[derive(Debug, Clone)]
pub struct Document {
    root: NodeId,
    nodes: BTreeMap<NodeId, Node>,
    ids: IdGenerator,
    images: BTreeMap<ImageHash, Vec<u8>>,
    selection: Vec<NodeId>,
    focused: Vec<NodeId>,
}

impl Document {
    /// Create a document holding an empty page
    pub fn new() -> Self {
        let mut ids = IdGenerator::new();
        let root = ids.next();
        let mut page = Node::new(NodeKind::Page, "Page 1");
        page.set_id(root);

        let mut nodes = BTreeMap::new();
        nodes.insert(root, page);

        Self {
            root,
            nodes,
            ids,
            images: BTreeMap::new(),
            selection: Vec::new(),
            focused: Vec::new(),
        }
    }

    /// Load a document from JSON, checking that the tree links are consistent
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let file: DocumentFile =
            serde_json::from_str(json).map_err(|e| SceneError::InvalidDocument(e.to_string()))?;

        let mut ids = IdGenerator::new();
        let mut nodes = BTreeMap::new();
        for node in file.nodes {
            ids.retain(node.id());
            if nodes.insert(node.id(), node).is_some() {
                return Err(SceneError::InvalidDocument("duplicate node id".to_string()));
            }
        }

        match nodes.get(&file.root) {
            Some(root) if root.kind == NodeKind::Page && root.parent().is_none() => {}
            Some(_) => {
                return Err(SceneError::InvalidDocument(format!(
                    "root {} is not a top-level page",
                    file.root
                )))
            }
            None => return Err(SceneError::NodeNotFound(file.root)),
        }

        for node in nodes.values() {
            for child in node.children() {
                let linked = nodes.get(child).map(|c| c.parent() == Some(node.id()));
                match linked {
                    Some(true) => {}
                    Some(false) => {
                        return Err(SceneError::InvalidDocument(format!(
                            "node {} lists {} as a child but is not its parent",
                            node.id(),
                            child
                        )))
                    }
                    None => return Err(SceneError::NodeNotFound(*child)),
                }
            }
            if let Some(parent) = node.parent() {
                let listed = nodes
                    .get(&parent)
                    .map_or(false, |p| p.children().contains(&node.id()));
                if !listed {
                    return Err(SceneError::InvalidDocument(format!(
                        "node {} is missing from the children of {}",
                        node.id(),
                        parent
                    )));
                }
            }
        }

        log::debug!("Loaded document with {} nodes", nodes.len());

        Ok(Self {
            root: file.root,
            nodes,
            ids,
            images: BTreeMap::new(),
            selection: file.selection,
            focused: Vec::new(),
        })
    }

    /// Serialize to pretty-printed JSON
    ///
    /// Registered image bytes are not included; paints keep their hashes.
    pub fn to_json(&self) -> SceneResult<String> {
        let file = DocumentFile {
            root: self.root,
            nodes: self.nodes.values().cloned().collect(),
            selection: self.selection.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| SceneError::InvalidDocument(e.to_string()))
    }

    /// The page every other node hangs off
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Insert a new node as the last child of `parent`
    pub fn insert(&mut self, parent: NodeId, mut node: Node) -> SceneResult<NodeId> {
        self.container(parent)?;
        let id = self.ids.next();
        node.set_id(id);
        node.set_parent(None);
        node.children_mut().clear();
        self.nodes.insert(id, node);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Number of nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current selection
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Nodes most recently brought into view
    pub fn focused(&self) -> &[NodeId] {
        &self.focused
    }

    /// Bytes of a registered image
    pub fn image(&self, hash: &ImageHash) -> Option<&[u8]> {
        self.images.get(hash).map(Vec::as_slice)
    }

    fn container(&self, id: NodeId) -> SceneResult<&Node> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        if node.capabilities().children {
            Ok(node)
        } else {
            Err(SceneError::NotAContainer(id))
        }
    }

    /// Whether `node` is `ancestor` or sits somewhere below it
    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(Node::parent);
        }
        false
    }

    fn copy_subtree(&mut self, id: NodeId, parent: Option<NodeId>) -> SceneResult<NodeId> {
        let source = self.nodes.get(&id).cloned().ok_or(SceneError::NodeNotFound(id))?;
        let copy_id = self.ids.next();

        let mut copy = source.clone();
        copy.set_id(copy_id);
        copy.set_parent(parent);
        copy.children_mut().clear();
        self.nodes.insert(copy_id, copy);

        for child in source.children() {
            let child_copy = self.copy_subtree(*child, Some(copy_id))?;
            if let Some(node) = self.nodes.get_mut(&copy_id) {
                node.children_mut().push(child_copy);
            }
        }
        Ok(copy_id)
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children() {
                self.remove_subtree(*child);
            }
        }
    }

    fn collect_named(&self, id: NodeId, name: &str, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        for child in node.children() {
            if let Some(c) = self.nodes.get(child) {
                if c.name == name {
                    out.push(*child);
                }
            }
            self.collect_named(*child, name, out);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHost for Document {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    fn clone_node(&mut self, id: NodeId) -> SceneResult<NodeId> {
        if id == self.root {
            return Err(SceneError::RootOperation("cloned"));
        }
        self.copy_subtree(id, None)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.container(parent)?;
        if child == self.root {
            return Err(SceneError::RootOperation("moved"));
        }
        let old_parent = self
            .nodes
            .get(&child)
            .ok_or(SceneError::NodeNotFound(child))?
            .parent();
        if self.is_within(parent, child) {
            return Err(SceneError::Cycle { parent, child });
        }

        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children_mut().retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.set_parent(Some(parent));
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children_mut().push(child);
        }
        Ok(())
    }

    fn find_all_by_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        if self.container(root).is_ok() {
            self.collect_named(root, name, &mut found);
        }
        found
    }

    fn find_component_by_name(&self, name: &str) -> Option<NodeId> {
        let page = self.nodes.get(&self.root)?;
        page.children().iter().copied().find(|id| {
            self.nodes
                .get(id)
                .map_or(false, |n| n.kind == NodeKind::Component && n.name == name)
        })
    }

    fn swap_component(&mut self, instance: NodeId, component: NodeId) -> SceneResult<()> {
        let source = self.nodes.get(&component).ok_or(SceneError::NodeNotFound(component))?;
        if source.kind != NodeKind::Component {
            return Err(SceneError::InvalidDocument(format!("{} is not a component", component)));
        }
        let template: Vec<NodeId> = source.children().to_vec();

        let target = self.nodes.get(&instance).ok_or(SceneError::NodeNotFound(instance))?;
        if !target.capabilities().instance {
            return Err(SceneError::InvalidDocument(format!("{} is not an instance", instance)));
        }
        let previous: Vec<NodeId> = target.children().to_vec();

        for child in previous {
            self.remove_subtree(child);
        }
        let mut children = Vec::with_capacity(template.len());
        for child in template {
            children.push(self.copy_subtree(child, Some(instance))?);
        }

        if let Some(node) = self.nodes.get_mut(&instance) {
            *node.children_mut() = children;
            node.main_component = Some(component);
        }
        Ok(())
    }

    fn create_image(&mut self, bytes: Vec<u8>) -> ImageHash {
        let hash = ImageHash::of(&bytes);
        self.images.entry(hash.clone()).or_insert(bytes);
        hash
    }

    fn set_selection(&mut self, ids: Vec<NodeId>) {
        self.selection = ids;
    }

    fn focus(&mut self, ids: &[NodeId]) {
        self.focused = ids.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn card_document() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new();
        let card = doc
            .insert(doc.root(), Node::new(NodeKind::Frame, "Card").with_size(100.0, 50.0))
            .unwrap();
        let title = doc.insert(card, Node::new(NodeKind::Text, "Title")).unwrap();
        doc.insert(card, Node::new(NodeKind::Rectangle, "Background")).unwrap();
        (doc, card, title)
    }

    #[test]
    fn test_insert_links_parent_and_child() {
        let (doc, card, title) = card_document();
        assert_eq!(doc.parent_of(title), Some(card));
        assert_eq!(doc.parent_of(card), Some(doc.root()));
        assert_eq!(doc.node(card).unwrap().children().len(), 2);
    }

    #[test]
    fn test_insert_into_leaf_fails() {
        let (mut doc, _, title) = card_document();
        let err = doc.insert(title, Node::new(NodeKind::Rectangle, "X")).unwrap_err();
        assert_eq!(err, SceneError::NotAContainer(title));
    }

    #[test]
    fn test_clone_is_deep_and_detached() {
        let (mut doc, card, title) = card_document();
        let copy = doc.clone_node(card).unwrap();

        assert_ne!(copy, card);
        assert_eq!(doc.parent_of(copy), None);
        let copy_children = doc.node(copy).unwrap().children().to_vec();
        assert_eq!(copy_children.len(), 2);
        assert!(!copy_children.contains(&title));
        assert_eq!(doc.parent_of(copy_children[0]), Some(copy));

        // Editing the copy leaves the original alone
        doc.node_mut(copy_children[0]).unwrap().name = "Renamed".to_string();
        assert_eq!(doc.node(title).unwrap().name, "Title");
    }

    #[test]
    fn test_root_cannot_be_cloned_or_moved() {
        let (mut doc, card, _) = card_document();
        let root = doc.root();
        assert!(doc.clone_node(root).is_err());
        assert_eq!(doc.append_child(card, root), Err(SceneError::RootOperation("moved")));
    }

    #[test]
    fn test_append_rejects_cycles() {
        let (mut doc, card, _) = card_document();
        let inner = doc.insert(card, Node::new(NodeKind::Frame, "Inner")).unwrap();
        assert_eq!(
            doc.append_child(inner, card),
            Err(SceneError::Cycle { parent: inner, child: card })
        );
    }

    #[test]
    fn test_append_moves_between_parents() {
        let (mut doc, card, title) = card_document();
        let other = doc.insert(doc.root(), Node::new(NodeKind::Frame, "Other")).unwrap();
        doc.append_child(other, title).unwrap();

        assert!(!doc.node(card).unwrap().children().contains(&title));
        assert_eq!(doc.node(other).unwrap().children(), &[title]);
        assert_eq!(doc.parent_of(title), Some(other));
    }

    #[test]
    fn test_find_all_by_name_is_pre_order_and_excludes_root() {
        let mut doc = Document::new();
        let card = doc.insert(doc.root(), Node::new(NodeKind::Frame, "Card")).unwrap();
        let a = doc.insert(card, Node::new(NodeKind::Frame, "Card")).unwrap();
        let b = doc.insert(a, Node::new(NodeKind::Rectangle, "Card")).unwrap();
        let c = doc.insert(card, Node::new(NodeKind::Rectangle, "Card")).unwrap();

        assert_eq!(doc.find_all_by_name(card, "Card"), vec![a, b, c]);
        assert!(doc.find_all_by_name(b, "Card").is_empty());
        assert!(doc.find_all_by_name(card, "card").is_empty());
    }

    #[test]
    fn test_find_component_only_top_level() {
        let mut doc = Document::new();
        let button = doc
            .insert(doc.root(), Node::new(NodeKind::Component, "Button"))
            .unwrap();
        let frame = doc.insert(doc.root(), Node::new(NodeKind::Frame, "Holder")).unwrap();
        doc.insert(frame, Node::new(NodeKind::Component, "Nested")).unwrap();

        assert_eq!(doc.find_component_by_name("Button"), Some(button));
        assert_eq!(doc.find_component_by_name("Nested"), None);
        assert_eq!(doc.find_component_by_name("Holder"), None);
    }

    #[test]
    fn test_swap_component_replaces_children() {
        let mut doc = Document::new();
        let primary = doc.insert(doc.root(), Node::new(NodeKind::Component, "Primary")).unwrap();
        doc.insert(primary, Node::new(NodeKind::Text, "Label")).unwrap();
        let secondary = doc
            .insert(doc.root(), Node::new(NodeKind::Component, "Secondary"))
            .unwrap();
        doc.insert(secondary, Node::new(NodeKind::Ellipse, "Dot")).unwrap();
        doc.insert(secondary, Node::new(NodeKind::Text, "Label")).unwrap();

        let instance = doc
            .insert(doc.root(), Node::new(NodeKind::Instance, "Btn").with_main_component(primary))
            .unwrap();
        doc.swap_component(instance, primary).unwrap();
        assert_eq!(doc.node(instance).unwrap().children().len(), 1);

        doc.swap_component(instance, secondary).unwrap();
        let node = doc.node(instance).unwrap();
        assert_eq!(node.main_component, Some(secondary));
        let names: Vec<_> = node
            .children()
            .iter()
            .map(|c| doc.node(*c).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Dot", "Label"]);
    }

    #[test]
    fn test_create_image_dedupes() {
        let mut doc = Document::new();
        let a = doc.create_image(vec![1, 2, 3]);
        let b = doc.create_image(vec![1, 2, 3]);
        assert_eq!(a, b);
        assert_eq!(doc.image(&a), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn test_json_round_trip_keeps_ids_fresh() {
        let (doc, card, _) = card_document();
        let json = doc.to_json().unwrap();
        let mut loaded = Document::from_json(&json).unwrap();

        assert_eq!(loaded.len(), doc.len());
        assert_eq!(loaded.node(card).unwrap().name, "Card");
        let copy = loaded.clone_node(card).unwrap();
        assert!(copy.raw() > 4);
    }

    #[test]
    fn test_from_json_rejects_broken_links() {
        let json = r#"{
            "root": 1,
            "nodes": [
                {"id": 1, "name": "Page", "kind": "page", "children": [2]},
                {"id": 2, "name": "Card", "kind": "frame"}
            ]
        }"#;
        assert!(matches!(Document::from_json(json), Err(SceneError::InvalidDocument(_))));

        let missing_root = r#"{"root": 9, "nodes": []}"#;
        assert_eq!(
            Document::from_json(missing_root).unwrap_err(),
            SceneError::NodeNotFound(NodeId::from_raw(9))
        );
    }
}
