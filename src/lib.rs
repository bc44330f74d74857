// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM View State
//!
//! Hierarchical visibility-state management for BIM model viewers.
//!
//! A viewer inspecting a building model by construction sequence needs to
//! answer one question over and over: given the currently selected grouping
//! (an assembly, a building step), which elements should be shown, hidden,
//! or ghosted? This crate owns that state and that answer:
//!
//! - **Trees**: named hierarchies of grouping nodes with building elements at
//!   the leaves, built from element properties (see [`build_tree`]) and
//!   stored in a slot-map arena ([`Tree`]).
//! - **Visibility maps**: per-tree state for every grouping node
//!   ([`VisibilityMap`]), resolved top-down with inherited states into three
//!   disjoint buckets ([`resolve`]): Hidden is absorbing, and a visible node
//!   cannot escape a ghost ancestor.
//! - **Modes**: policies ([`VisibilityMode`]) that rewrite the map when the
//!   selection changes — isolate, show-previous, show-neighbors.
//! - **Collaborators**: the 3D scene stays behind the [`SceneRenderer`],
//!   [`Highlighter`], and [`ElementRepository`] traits; highlight requests
//!   fan out per source model and join before the selection completes.
//!
//! ## Quick Start
//!
//! ```
//! use bim_view_state::{build_tree, Element, VisibilityMap, resolve};
//!
//! let elements = vec![
//!     Element::new("w1", "Wall", "model-a", vec![101])
//!         .with_property("Assembly", "A1")
//!         .with_property("BuildingStep", "S1"),
//!     Element::new("w2", "Slab", "model-a", vec![102])
//!         .with_property("Assembly", "A1")
//!         .with_property("BuildingStep", "S2"),
//! ];
//!
//! let tree = build_tree("assembly", &elements, &["Assembly", "BuildingStep"]).unwrap();
//! let map = VisibilityMap::for_tree(&tree);
//!
//! let buckets = resolve(&tree, &map);
//! assert_eq!(buckets.visible.len(), 2);
//! ```
//!
//! Mutation, mode navigation, and scene pushes go through
//! [`VisibilityTreeManager`].

pub mod builder;
pub mod collaborators;
pub mod element;
pub mod error;
pub mod events;
pub mod manager;
pub mod state;
pub mod tree;
pub mod visibility;

pub use builder::{build_tree, UNSPECIFIED_GROUP};
pub use collaborators::{ElementRepository, FragmentMap, Highlighter, Rgba, SceneRenderer};
pub use element::{group_by_model, Element};
pub use error::{Error, Result};
pub use events::Event;
pub use manager::{
    ManagerEvents, TreeContainer, VisibilityTreeManager, SELECT_CHANNEL,
};
pub use state::{Adjacency, NodeTag, SelectionGroup, VisibilityMode, VisibilityState};
pub use tree::{NodeData, NodeKey, Tree};
pub use visibility::{resolve, VisibilityBuckets, VisibilityMap};
