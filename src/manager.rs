// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The visibility-tree manager.
//!
//! Owns named trees of building elements and their visibility maps, applies
//! visibility-mode policies when the selected grouping changes, resolves
//! effective per-element visibility, and pushes the result to the scene
//! renderer. Change notifications go out through synchronous [`Event`]s.
//!
//! All map mutation is synchronous and not re-entrant: callers must not
//! mutate the same tree's map while a resolution pass is in progress. The
//! only async surface is [`VisibilityTreeManager::select`], which fans
//! highlight calls out per source model.

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::collaborators::{ElementRepository, Highlighter, Rgba, SceneRenderer};
use crate::element::group_by_model;
use crate::events::Event;
use crate::state::{Adjacency, NodeTag, SelectionGroup, VisibilityMode, VisibilityState};
use crate::tree::{NodeKey, Tree};
use crate::visibility::{resolve, VisibilityBuckets, VisibilityMap};

/// Highlight channel used for the active selection.
pub const SELECT_CHANNEL: &str = "select";

/// A stored tree together with its visibility map.
#[derive(Debug, Clone)]
pub struct TreeContainer {
    pub tree: Tree,
    pub visibility: VisibilityMap,
}

/// Change notifications emitted by the manager. Delivery is synchronous and
/// in subscription order, at the moment of the state change.
#[derive(Debug, Default)]
pub struct ManagerEvents {
    /// A tree was added or replaced. Payload: tree id.
    pub on_tree_changed: Event<String>,
    /// A different tree became active. Payload: tree id.
    pub on_active_tree_changed: Event<String>,
    /// A tree's visibility map was rewritten. Payload: tree id + snapshot.
    pub on_visibility_map_changed: Event<(String, VisibilityMap)>,
    /// The selection group was replaced.
    pub on_selection_changed: Event<SelectionGroup>,
    /// The visibility mode was changed.
    pub on_mode_changed: Event<VisibilityMode>,
    /// A resolution pass completed. Payload: the three buckets pushed to the
    /// renderer.
    pub on_visibility_resolved: Event<VisibilityBuckets>,
}

/// Stateful manager for element trees, visibility maps, and selection.
pub struct VisibilityTreeManager {
    trees: FxHashMap<String, TreeContainer>,
    active: Option<String>,
    selection: Option<SelectionGroup>,
    mode: VisibilityMode,
    pub events: ManagerEvents,
}

impl VisibilityTreeManager {
    /// Creates a manager with no trees, no selection, and `Isolate` mode.
    pub fn new() -> Self {
        Self {
            trees: FxHashMap::default(),
            active: None,
            selection: None,
            mode: VisibilityMode::Isolate,
            events: ManagerEvents::default(),
        }
    }

    // --- Tree store ---

    /// Inserts or replaces a tree under its own id. When no map is supplied,
    /// derives one with every non-leaf node Visible. Returns the stored
    /// container.
    pub fn add_tree(&mut self, tree: Tree, visibility: Option<VisibilityMap>) -> &TreeContainer {
        let id = tree.id().to_string();
        let visibility = visibility.unwrap_or_else(|| VisibilityMap::for_tree(&tree));
        self.trees
            .insert(id.clone(), TreeContainer { tree, visibility });
        self.events.on_tree_changed.trigger(&id);
        &self.trees[&id]
    }

    /// Marks a tree as active for default queries. Returns `false` when no
    /// tree exists under `id`.
    pub fn set_active(&mut self, id: &str) -> bool {
        if !self.trees.contains_key(id) {
            debug!(tree = id, "cannot activate unknown tree; add it first");
            return false;
        }
        let id = id.to_string();
        self.active = Some(id.clone());
        self.events.on_active_tree_changed.trigger(&id);
        self.notify_map_changed(&id);
        true
    }

    /// Returns the stored container for a tree id.
    pub fn tree(&self, id: &str) -> Option<&TreeContainer> {
        self.trees.get(id)
    }

    /// Returns the active tree's container, if one is set.
    pub fn active_tree(&self) -> Option<&TreeContainer> {
        self.active.as_deref().and_then(|id| self.trees.get(id))
    }

    /// Id of the active tree.
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    // --- Selection and mode ---

    /// The currently selected grouping, if any.
    pub fn selection(&self) -> Option<&SelectionGroup> {
        self.selection.as_ref()
    }

    /// Replaces the selection group wholesale and notifies observers.
    pub fn set_selection(&mut self, group: SelectionGroup) {
        self.selection = Some(group.clone());
        self.events.on_selection_changed.trigger(&group);
    }

    /// The current visibility mode.
    pub fn mode(&self) -> VisibilityMode {
        self.mode
    }

    /// Changes the visibility mode used on the next selection change.
    pub fn set_mode(&mut self, mode: VisibilityMode) {
        self.mode = mode;
        self.events.on_mode_changed.trigger(&mode);
    }

    // --- Visibility editor ---

    /// Sets the visibility state of one tracked node. Silently ignores an
    /// unknown tree, an untracked node id, or a state equal to the current
    /// one. When `propagate` is true and the map changed, runs one resolution
    /// pass and pushes the result to `renderer`.
    pub fn set_visibility(
        &mut self,
        tree_id: &str,
        node_id: &str,
        state: VisibilityState,
        propagate: bool,
        renderer: &mut dyn SceneRenderer,
    ) {
        if !self.set_state(tree_id, node_id, state) {
            return;
        }
        if propagate {
            self.refresh(tree_id, renderer);
        }
    }

    /// Map mutation primitive. Returns `true` if an entry actually changed.
    fn set_state(&mut self, tree_id: &str, node_id: &str, state: VisibilityState) -> bool {
        let container = match self.trees.get_mut(tree_id) {
            Some(container) => container,
            None => {
                debug!(tree = tree_id, "visibility change ignored: unknown tree");
                return false;
            }
        };
        if !container.visibility.contains(node_id) {
            debug!(
                tree = tree_id,
                node = node_id,
                "visibility change ignored: node not tracked"
            );
            return false;
        }
        if container.visibility.get(node_id) == Some(state) {
            trace!(node = node_id, state = %state, "visibility unchanged");
            return false;
        }
        container.visibility.set(node_id, state);
        true
    }

    /// Resolves the tree's visibility map and pushes the three buckets to the
    /// renderer: Visible shown (color reset), Hidden not rendered, Ghost
    /// shown with a de-emphasis tint. Emits `on_visibility_resolved`.
    ///
    /// An empty map resolves to everything Visible, so downstream observers
    /// never stall waiting for a result.
    pub fn refresh(&self, tree_id: &str, renderer: &mut dyn SceneRenderer) {
        let container = match self.trees.get(tree_id) {
            Some(container) => container,
            None => {
                debug!(tree = tree_id, "refresh ignored: unknown tree");
                return;
            }
        };

        if container.visibility.is_empty() {
            warn!(tree = tree_id, "no visibility entries; showing all elements");
        }
        let buckets = resolve(&container.tree, &container.visibility);

        renderer.set_visibility(&group_by_model(&buckets.visible), true);
        renderer.set_color(&group_by_model(&buckets.visible), None);
        renderer.set_visibility(&group_by_model(&buckets.hidden), false);
        renderer.set_visibility(&group_by_model(&buckets.ghost), true);
        renderer.set_color(&group_by_model(&buckets.ghost), Some(Rgba::GHOST));

        self.events.on_visibility_resolved.trigger(&buckets);
    }

    // --- Mode navigator ---

    /// Hides every node sharing the selected node's tag except the selected
    /// one. Shorthand for [`Self::apply_mode`] with `Isolate`.
    pub fn isolate(
        &mut self,
        group: &SelectionGroup,
        tree_id: &str,
        renderer: &mut dyn SceneRenderer,
    ) {
        self.apply_mode(Some(group), Some(VisibilityMode::Isolate), tree_id, renderer);
    }

    /// Rewrites the visibility map for all nodes sharing the selected node's
    /// tag according to `mode`, then resolves and pushes exactly once.
    /// Falls back to the manager's current selection/mode when `None`.
    ///
    /// The selected node's direct parent is always forced Visible. Only one
    /// ancestor level is walked; deeper ancestors keep their states
    /// (documented limitation of the navigation behavior).
    pub fn apply_mode(
        &mut self,
        group: Option<&SelectionGroup>,
        mode: Option<VisibilityMode>,
        tree_id: &str,
        renderer: &mut dyn SceneRenderer,
    ) {
        let group = match group.cloned().or_else(|| self.selection.clone()) {
            Some(group) => group,
            None => {
                debug!(tree = tree_id, "mode update ignored: no selection group");
                return;
            }
        };
        let mode = mode.unwrap_or(self.mode);

        let plan = match self.mode_plan(tree_id, &group, mode) {
            Some(plan) => plan,
            None => return,
        };
        for (node_id, state) in plan {
            self.set_state(tree_id, &node_id, state);
        }

        self.notify_map_changed(tree_id);
        self.refresh(tree_id, renderer);
    }

    /// Computes the map rewrites for one mode application without touching
    /// the map. Returns `None` when the tree or node is unknown.
    fn mode_plan(
        &self,
        tree_id: &str,
        group: &SelectionGroup,
        mode: VisibilityMode,
    ) -> Option<Vec<(String, VisibilityState)>> {
        let container = match self.trees.get(tree_id) {
            Some(container) => container,
            None => {
                debug!(tree = tree_id, "mode update ignored: unknown tree");
                return None;
            }
        };
        let tree = &container.tree;
        let node_key = match tree.key_of(&group.node_id) {
            Some(key) => key,
            None => {
                debug!(node = %group.node_id, "mode update ignored: node not in tree");
                return None;
            }
        };
        let tag = tree.node(node_key)?.tag().clone();

        let mut plan = Vec::new();

        // Force the direct parent visible (one level only).
        if let Some(parent_key) = tree.parent(node_key) {
            if let Some(parent) = tree.node(parent_key) {
                plan.push((parent.id().to_string(), VisibilityState::Visible));
            }
        }

        match mode {
            VisibilityMode::Isolate => {
                for key in tree.keys_with_tag(&tag) {
                    let node = tree.node(key)?;
                    let state = if key == node_key {
                        VisibilityState::Visible
                    } else {
                        VisibilityState::Hidden
                    };
                    plan.push((node.id().to_string(), state));
                }
                for &child in tree.children(node_key) {
                    if let Some(node) = tree.node(child) {
                        plan.push((node.id().to_string(), VisibilityState::Visible));
                    }
                }
            }
            VisibilityMode::SelectGroupOnly => {
                // Just select; visibility stays as-is.
            }
            VisibilityMode::ShowPrevious => {
                self.neighbor_plan(tree, node_key, &tag, true, &mut plan);
            }
            VisibilityMode::ShowNeighbors => {
                self.neighbor_plan(tree, node_key, &tag, false, &mut plan);
            }
        }

        Some(plan)
    }

    /// Shared plan for `ShowPrevious` / `ShowNeighbors`: same-parent same-tag
    /// siblings stay visible (all of them, or only those up to and including
    /// the selected node), every other same-tag node is hidden. Parents of
    /// the visible set and the selected node's children are forced visible.
    fn neighbor_plan(
        &self,
        tree: &Tree,
        node_key: NodeKey,
        tag: &NodeTag,
        only_previous: bool,
        plan: &mut Vec<(String, VisibilityState)>,
    ) {
        let parent_key = match tree.parent(node_key) {
            Some(key) => key,
            None => {
                // The selected node is the root; there is no sibling level.
                debug!("neighbor navigation ignored: selected node has no parent");
                return;
            }
        };

        let mut visible = Vec::new();
        let mut hidden = Vec::new();
        let mut found = false;

        for key in tree.keys_with_tag(tag) {
            let same_parent = tree.parent(key) == Some(parent_key);
            if same_parent && !found {
                visible.push(key);
                if key == node_key {
                    found = true;
                }
            } else if same_parent && !only_previous {
                visible.push(key);
            } else {
                hidden.push(key);
            }
        }

        for key in hidden {
            if let Some(node) = tree.node(key) {
                plan.push((node.id().to_string(), VisibilityState::Hidden));
            }
        }
        for key in visible {
            if let Some(node) = tree.node(key) {
                plan.push((node.id().to_string(), VisibilityState::Visible));
            }
            if let Some(parent) = tree.parent(key).and_then(|p| tree.node(p)) {
                plan.push((parent.id().to_string(), VisibilityState::Visible));
            }
        }
        for &child in tree.children(node_key) {
            if let Some(node) = tree.node(child) {
                plan.push((node.id().to_string(), VisibilityState::Visible));
            }
        }
    }

    // --- Adjacent-group navigation ---

    /// Returns the previous/next node sharing `current`'s tag, in depth-first
    /// pre-order over the tree. Non-wrapping: `None` past either end.
    pub fn adjacent_group(
        &self,
        tree_id: &str,
        current: &SelectionGroup,
        direction: Adjacency,
    ) -> Option<SelectionGroup> {
        let tree = &self.trees.get(tree_id)?.tree;
        let keys = tree.keys_with_tag(&current.tag);
        let pos = keys.iter().position(|&key| {
            tree.node(key)
                .map(|n| n.id() == current.node_id)
                .unwrap_or(false)
        })?;
        let target = match direction {
            Adjacency::Previous => pos.checked_sub(1)?,
            Adjacency::Next => pos + 1,
        };
        let node = tree.node(*keys.get(target)?)?;
        Some(SelectionGroup::new(node.id(), node.tag().clone()))
    }

    /// Returns the first node with the given tag, for callers that have no
    /// current selection yet.
    pub fn first_group(&self, tree_id: &str, tag: &NodeTag) -> Option<SelectionGroup> {
        let tree = &self.trees.get(tree_id)?.tree;
        let key = tree.keys_with_tag(tag).into_iter().next()?;
        let node = tree.node(key)?;
        Some(SelectionGroup::new(node.id(), node.tag().clone()))
    }

    // --- Selection bridge ---

    /// Highlights every element under the selected node: clears the selection
    /// channel, then issues one highlight call per source model, fanned out
    /// concurrently and joined. A model that fails to resolve is skipped;
    /// other models still complete.
    ///
    /// There is no cancellation: a newer selection simply issues a new
    /// clear+highlight sequence, and callers firing selections faster than
    /// the highlighter completes can race (known limitation).
    pub async fn select(
        &self,
        group: &SelectionGroup,
        tree_id: &str,
        highlighter: &dyn Highlighter,
        repository: &dyn ElementRepository,
    ) {
        let container = match self.trees.get(tree_id) {
            Some(container) => container,
            None => {
                debug!(tree = tree_id, "select ignored: unknown tree");
                return;
            }
        };
        let node_key = match container.tree.key_of(&group.node_id) {
            Some(key) => key,
            None => {
                debug!(node = %group.node_id, "select ignored: node not in tree");
                return;
            }
        };

        let elements = container.tree.collect_elements(node_key);
        let by_model = group_by_model(&elements);

        // The previous highlight must be gone before any new call starts.
        highlighter.clear(SELECT_CHANNEL).await;

        let calls = by_model.iter().map(|(model_id, elements)| async move {
            if !repository.contains_model(model_id) {
                warn!(model = %model_id, "skipping highlight: model not loaded");
                return;
            }
            let express_ids: Vec<u64> = elements
                .iter()
                .flat_map(|e| e.express_ids.iter().copied())
                .collect();
            match repository.resolve_fragments(&express_ids, model_id) {
                Some(fragments) if !fragments.is_empty() => {
                    highlighter
                        .highlight(SELECT_CHANNEL, &fragments, false, false)
                        .await;
                }
                _ => {
                    warn!(model = %model_id, "skipping highlight: no fragment data");
                }
            }
        });
        futures::future::join_all(calls).await;
    }

    fn notify_map_changed(&self, tree_id: &str) {
        if let Some(container) = self.trees.get(tree_id) {
            self.events
                .on_visibility_map_changed
                .trigger(&(tree_id.to_string(), container.visibility.clone()));
        }
    }
}

impl Default for VisibilityTreeManager {
    fn default() -> Self {
        Self::new()
    }
}
