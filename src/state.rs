// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visibility states, visibility modes, node classification tags, and the
//! active selection group.

use serde::{Deserialize, Serialize};

/// Render state of a tree node.
///
/// `Ghost` means "displayed but de-emphasized", distinct from `Hidden`. For
/// inheritance the severity order is Hidden > Ghost > Visible: a stricter
/// ancestor state overrides a looser descendant default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityState {
    Visible,
    Hidden,
    Ghost,
}

impl VisibilityState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityState::Visible => "Visible",
            VisibilityState::Hidden => "Hidden",
            VisibilityState::Ghost => "Ghost",
        }
    }
}

impl std::fmt::Display for VisibilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy controlling how a selection-group change reshapes the visibility map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityMode {
    /// Every same-tag node is hidden except the selected one.
    Isolate,
    /// Just select and highlight; visibility is left as-is.
    SelectGroupOnly,
    /// Same-parent siblings up to and including the selected node stay
    /// visible; everything after, and same-tag nodes under other parents,
    /// are hidden.
    ShowPrevious,
    /// Like `ShowPrevious` but all same-parent siblings stay visible
    /// regardless of order.
    ShowNeighbors,
}

/// Classification tag of a tree node.
///
/// Group nodes carry the name of the grouping property that produced them
/// (e.g. "Assembly", "BuildingStep"); leaves are tagged `Element`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeTag {
    Group(String),
    Element,
}

impl NodeTag {
    /// Returns `true` for element (leaf) tags.
    pub fn is_element(&self) -> bool {
        matches!(self, NodeTag::Element)
    }
}

/// The grouping currently in focus, typically the active building step.
///
/// Exactly one selection group is active per manager; replacing it is a full
/// overwrite, not a merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionGroup {
    /// Id of the selected tree node.
    pub node_id: String,
    /// Classification tag of the selected node.
    pub tag: NodeTag,
}

impl SelectionGroup {
    pub fn new(node_id: impl Into<String>, tag: NodeTag) -> Self {
        Self {
            node_id: node_id.into(),
            tag,
        }
    }
}

/// Direction for adjacent-group navigation within a grouping level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    Previous,
    Next,
}
