// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for tree construction.
//!
//! Runtime visibility operations are policy-based and never raise: an unknown
//! tree or node id is a logged no-op, not an error. `Error` only covers
//! structural misuse while building a tree.

/// Result type alias for tree-construction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing a tree.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced parent node does not exist in the tree.
    #[error("parent not found when adding node {0}")]
    ParentNotFound(String),

    /// A node with this id already exists in the tree.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// Children cannot be attached to an element (leaf) node.
    #[error("node {0} is an element leaf and cannot have children")]
    LeafParent(String),

    /// A tree cannot be built from an empty element list.
    #[error("cannot build tree {0}: no elements")]
    NoElements(String),

    /// A tree cannot be built without at least one grouping key.
    #[error("cannot build tree {0}: no grouping keys")]
    NoGroupingKeys(String),
}
