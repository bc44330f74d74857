// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based element tree.
//!
//! A [`Tree`] is a named hierarchy of grouping nodes with building elements
//! at the leaves. Nodes live in a slot map with stable, generational keys;
//! child lists hold owning keys and parent links hold non-owning keys, so the
//! parent back-references never create ownership cycles. A string-id index
//! gives O(1) lookup by node id, which is how the visibility map and the UI
//! address nodes.
//!
//! Invariants: exactly one root with no parent; a node is a leaf iff it
//! carries an [`Element`]; node ids are unique within a tree.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::element::Element;
use crate::error::{Error, Result};
use crate::state::NodeTag;

new_key_type! {
    /// Key for a tree node.
    pub struct NodeKey;
}

/// Data stored for a tree node.
#[derive(Debug, Clone)]
pub struct NodeData {
    id: String,
    name: String,
    tag: NodeTag,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    element: Option<Element>,
}

impl NodeData {
    /// Node id, unique within its tree.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name (for group nodes, the raw grouping-property value).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Classification tag.
    pub fn tag(&self) -> &NodeTag {
        &self.tag
    }

    /// The attached element, present iff this node is a leaf.
    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    /// Returns `true` if this node carries an element.
    pub fn is_leaf(&self) -> bool {
        self.element.is_some()
    }
}

/// A named tree of grouping nodes with elements at the leaves.
///
/// Built once from a flat element list (see [`crate::builder`]) and replaced
/// wholesale, never patched incrementally.
///
/// # Example
///
/// ```
/// use bim_view_state::{Element, Tree};
///
/// let mut tree = Tree::new("assembly");
/// let root = tree.root();
/// let step = tree.add_group(root, "A1/S1", "S1", "BuildingStep").unwrap();
/// tree.add_element(step, Element::new("w1", "Wall", "model-a", vec![101]))
///     .unwrap();
///
/// assert_eq!(tree.node_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    id: String,
    root: NodeKey,
    nodes: SlotMap<NodeKey, NodeData>,
    index: FxHashMap<String, NodeKey>,
}

impl Tree {
    /// Creates a tree containing only a root node. The root shares the tree's
    /// id and is tagged as the "Root" grouping.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData {
            id: id.clone(),
            name: id.clone(),
            tag: NodeTag::Group("Root".to_string()),
            parent: None,
            children: Vec::new(),
            element: None,
        });
        let mut index = FxHashMap::default();
        index.insert(id.clone(), root);

        Self {
            id,
            root,
            nodes,
            index,
        }
    }

    /// Tree id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key of the root node.
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // --- Construction ---

    /// Adds a grouping node under `parent`. `grouping` is the name of the
    /// grouping property this level was built from (e.g. "BuildingStep").
    pub fn add_group(
        &mut self,
        parent: NodeKey,
        id: impl Into<String>,
        name: impl Into<String>,
        grouping: impl Into<String>,
    ) -> Result<NodeKey> {
        self.add_node(parent, id.into(), name.into(), NodeTag::Group(grouping.into()), None)
    }

    /// Adds an element leaf under `parent`. The node id is the element id.
    pub fn add_element(&mut self, parent: NodeKey, element: Element) -> Result<NodeKey> {
        let id = element.id.clone();
        self.add_element_with_id(parent, id, element)
    }

    /// Adds an element leaf under `parent` with an explicit node id, for
    /// callers that must disambiguate repeated element ids.
    pub fn add_element_with_id(
        &mut self,
        parent: NodeKey,
        node_id: impl Into<String>,
        element: Element,
    ) -> Result<NodeKey> {
        let name = element.name.clone();
        self.add_node(parent, node_id.into(), name, NodeTag::Element, Some(element))
    }

    fn add_node(
        &mut self,
        parent: NodeKey,
        id: String,
        name: String,
        tag: NodeTag,
        element: Option<Element>,
    ) -> Result<NodeKey> {
        let parent_data = self
            .nodes
            .get(parent)
            .ok_or_else(|| Error::ParentNotFound(id.clone()))?;
        if parent_data.is_leaf() {
            return Err(Error::LeafParent(parent_data.id.clone()));
        }
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }

        let key = self.nodes.insert(NodeData {
            id: id.clone(),
            name,
            tag,
            parent: Some(parent),
            children: Vec::new(),
            element,
        });
        self.nodes[parent].children.push(key);
        self.index.insert(id, key);
        Ok(key)
    }

    // --- Lookup ---

    /// Returns the node data for the given key, or `None` if not found.
    pub fn node(&self, key: NodeKey) -> Option<&NodeData> {
        self.nodes.get(key)
    }

    /// Returns the key of the node with the given id, or `None` if not found.
    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    /// Returns the node data for the given id, or `None` if not found.
    pub fn get(&self, id: &str) -> Option<&NodeData> {
        self.key_of(id).and_then(|k| self.nodes.get(k))
    }

    /// Returns the parent key of a node, or `None` for the root.
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(|n| n.parent)
    }

    /// Returns the ordered child keys of a node.
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes
            .get(key)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    // --- Traversal ---

    /// Returns all node keys in depth-first pre-order. Within a parent this
    /// is child insertion order, which the mode navigator and adjacent-group
    /// lookup rely on.
    pub fn keys_preorder(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(key) = stack.pop() {
            out.push(key);
            if let Some(node) = self.nodes.get(key) {
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Returns the keys of all nodes carrying the given tag, in pre-order.
    pub fn keys_with_tag(&self, tag: &NodeTag) -> Vec<NodeKey> {
        self.keys_preorder()
            .into_iter()
            .filter(|&k| self.nodes.get(k).map(|n| &n.tag == tag).unwrap_or(false))
            .collect()
    }

    /// Returns the ids of all non-leaf nodes, in pre-order. This is the set
    /// of nodes a visibility map tracks.
    pub fn group_ids(&self) -> Vec<String> {
        self.keys_preorder()
            .into_iter()
            .filter_map(|k| self.nodes.get(k))
            .filter(|n| !n.is_leaf())
            .map(|n| n.id.clone())
            .collect()
    }

    /// Collects every element in the subtree rooted at `key`, in pre-order.
    pub fn collect_elements(&self, key: NodeKey) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(node) = self.nodes.get(k) {
                if let Some(element) = &node.element {
                    out.push(element.clone());
                }
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Collects every element in the whole tree, in pre-order.
    pub fn all_elements(&self) -> Vec<Element> {
        self.collect_elements(self.root)
    }
}
