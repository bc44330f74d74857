// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-tree visibility map and the state-resolution traversal.
//!
//! The resolution algorithm is a pure function of (tree, visibility map): it
//! never touches a renderer, which keeps it unit-testable without a live
//! scene. Inheritance rules, top-down from the root with an inherited state
//! of Visible:
//!
//! 1. a node's effective state is its own map entry, else the inherited state;
//! 2. leaves land in the bucket matching their effective state;
//! 3. Hidden is absorbing: a hidden container hides every descendant element
//!    regardless of inner map entries;
//! 4. an explicitly Visible node under an effective-Ghost ancestor is
//!    downgraded to Ghost — a visible child cannot escape a ghost container.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::state::VisibilityState;
use crate::tree::{NodeKey, Tree};

/// Mapping from non-leaf node id to visibility state.
///
/// Leaf (element) nodes are not tracked; their effective state is always
/// inherited. Created alongside a tree with every entry Visible, or supplied
/// explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityMap {
    entries: FxHashMap<String, VisibilityState>,
}

impl VisibilityMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map covering every non-leaf node of `tree`, all Visible.
    pub fn for_tree(tree: &Tree) -> Self {
        let entries = tree
            .group_ids()
            .into_iter()
            .map(|id| (id, VisibilityState::Visible))
            .collect();
        Self { entries }
    }

    /// Returns the state recorded for a node id, if tracked.
    pub fn get(&self, node_id: &str) -> Option<VisibilityState> {
        self.entries.get(node_id).copied()
    }

    /// Returns `true` if the node id is tracked by this map.
    pub fn contains(&self, node_id: &str) -> bool {
        self.entries.contains_key(node_id)
    }

    /// Sets the state for a node id. Only ids already tracked (or inserted
    /// here) participate in resolution; leaves are never tracked.
    pub fn set(&mut self, node_id: impl Into<String>, state: VisibilityState) {
        self.entries.insert(node_id.into(), state);
    }

    /// Number of tracked nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no nodes are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over (node id, state) entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, VisibilityState)> {
        self.entries.iter().map(|(id, state)| (id.as_str(), *state))
    }
}

/// The three disjoint element sets a resolution pass produces: the scene's
/// target render state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityBuckets {
    pub visible: Vec<Element>,
    pub hidden: Vec<Element>,
    pub ghost: Vec<Element>,
}

impl VisibilityBuckets {
    /// Total number of elements across all three buckets.
    pub fn len(&self) -> usize {
        self.visible.len() + self.hidden.len() + self.ghost.len()
    }

    /// Returns `true` if all buckets are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, state: VisibilityState, element: Element) {
        match state {
            VisibilityState::Visible => self.visible.push(element),
            VisibilityState::Hidden => self.hidden.push(element),
            VisibilityState::Ghost => self.ghost.push(element),
        }
    }
}

/// Resolves the effective visibility of every element in `tree` against
/// `map`. Every leaf element lands in exactly one bucket.
pub fn resolve(tree: &Tree, map: &VisibilityMap) -> VisibilityBuckets {
    let mut buckets = VisibilityBuckets::default();
    visit(tree, map, tree.root(), VisibilityState::Visible, &mut buckets);
    buckets
}

fn visit(
    tree: &Tree,
    map: &VisibilityMap,
    key: NodeKey,
    inherited: VisibilityState,
    buckets: &mut VisibilityBuckets,
) {
    let node = match tree.node(key) {
        Some(node) => node,
        None => return,
    };

    let effective = match (map.get(node.id()), inherited) {
        // Ghost downgrade: an explicit Visible entry cannot escape a ghost
        // ancestor.
        (Some(VisibilityState::Visible), VisibilityState::Ghost) => VisibilityState::Ghost,
        (Some(own), _) => own,
        (None, _) => inherited,
    };

    if let Some(element) = node.element() {
        buckets.push(effective, element.clone());
        return;
    }

    if effective == VisibilityState::Hidden {
        // Absorbing: a hidden container hides everything inside it, even if
        // an inner node claims otherwise.
        for element in tree.collect_elements(key) {
            buckets.hidden.push(element);
        }
        return;
    }

    for &child in tree.children(key) {
        visit(tree, map, child, effective, buckets);
    }
}
