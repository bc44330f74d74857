// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building-element value type.
//!
//! Elements are opaque leaf entities owned by the element repository and
//! referenced, never owned, by tree nodes. They are immutable once loaded;
//! the tree stores clones of these small descriptors, not geometry.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A building element as seen by the view layer: identity, source model, and
/// the properties used for grouping (assembly, building step, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Stable element id, unique across models (IFC GlobalId or similar).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Id of the source model this element was loaded from.
    pub model_id: String,
    /// Geometry identifiers within the source model. The element repository
    /// resolves these to renderable fragment handles per model.
    pub express_ids: Vec<u64>,
    /// Property key/value pairs used for tree grouping.
    pub properties: FxHashMap<String, String>,
}

impl Element {
    /// Creates an element with no properties.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        model_id: impl Into<String>,
        express_ids: Vec<u64>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            model_id: model_id.into(),
            express_ids,
            properties: FxHashMap::default(),
        }
    }

    /// Adds a grouping property, builder-style.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns the value of a grouping property, if present.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Groups elements by their source model id, preserving element order within
/// each group. Collaborator contracts take their inputs in this shape.
pub fn group_by_model(elements: &[Element]) -> FxHashMap<String, Vec<Element>> {
    let mut by_model: FxHashMap<String, Vec<Element>> = FxHashMap::default();
    for element in elements {
        by_model
            .entry(element.model_id.clone())
            .or_default()
            .push(element.clone());
    }
    by_model
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_lookup() {
        let e = Element::new("w1", "Wall", "model-a", vec![101])
            .with_property("Assembly", "A1")
            .with_property("BuildingStep", "S2");

        assert_eq!(e.property("Assembly"), Some("A1"));
        assert_eq!(e.property("BuildingStep"), Some("S2"));
        assert_eq!(e.property("Station"), None);
    }

    #[test]
    fn grouping_by_model_preserves_order() {
        let elements = vec![
            Element::new("a", "A", "m1", vec![1]),
            Element::new("b", "B", "m2", vec![2]),
            Element::new("c", "C", "m1", vec![3]),
        ];

        let grouped = group_by_model(&elements);
        assert_eq!(grouped.len(), 2);
        let m1: Vec<_> = grouped["m1"].iter().map(|e| e.id.as_str()).collect();
        assert_eq!(m1, ["a", "c"]);
    }
}
