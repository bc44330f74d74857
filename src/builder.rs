// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tree construction from element properties.
//!
//! Groups a flat element list by successive property values (e.g. by
//! "Assembly", then "BuildingStep") and attaches each element as a leaf under
//! its deepest matching group path. Group nodes are created on first
//! encounter, so group order follows element order.
//!
//! Group-node ids are slash-joined value paths ("A1/S2"), which keeps equal
//! values under different parents distinct. Elements missing a grouping
//! property fall into an "Unspecified" group at that level.

use tracing::debug;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::tree::Tree;

/// Group name used when an element lacks a grouping property.
pub const UNSPECIFIED_GROUP: &str = "Unspecified";

/// Builds a tree named `id` by grouping `elements` by the given property
/// `keys`, outermost first.
///
/// # Example
///
/// ```
/// use bim_view_state::{build_tree, Element};
///
/// let elements = vec![
///     Element::new("w1", "Wall", "model-a", vec![101])
///         .with_property("Assembly", "A1")
///         .with_property("BuildingStep", "S1"),
/// ];
/// let tree = build_tree("assembly", &elements, &["Assembly", "BuildingStep"]).unwrap();
/// assert!(tree.get("A1/S1").is_some());
/// ```
pub fn build_tree(id: impl Into<String>, elements: &[Element], keys: &[&str]) -> Result<Tree> {
    let id = id.into();
    if elements.is_empty() {
        return Err(Error::NoElements(id));
    }
    if keys.is_empty() {
        return Err(Error::NoGroupingKeys(id));
    }

    let mut tree = Tree::new(id);

    for element in elements {
        let mut parent = tree.root();
        let mut path = String::new();

        for key in keys {
            let value = element.property(key).unwrap_or(UNSPECIFIED_GROUP);
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(value);

            parent = match tree.key_of(&path) {
                Some(existing) => existing,
                None => tree.add_group(parent, path.clone(), value, *key)?,
            };
        }

        // Repeated element ids get a numeric suffix so node ids stay unique.
        let mut node_id = element.id.clone();
        let mut n = 1;
        while tree.key_of(&node_id).is_some() {
            n += 1;
            node_id = format!("{}#{}", element.id, n);
        }
        if n > 1 {
            debug!(element = %element.id, node = %node_id, "duplicate element id in tree input");
        }
        tree.add_element_with_id(parent, node_id, element.clone())?;
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NodeTag;

    fn element(id: &str, assembly: &str, step: &str) -> Element {
        Element::new(id, id.to_uppercase(), "model-a", vec![1])
            .with_property("Assembly", assembly)
            .with_property("BuildingStep", step)
    }

    #[test]
    fn groups_by_successive_keys() {
        let elements = vec![
            element("w1", "A1", "S1"),
            element("w2", "A1", "S2"),
            element("w3", "A2", "S1"),
        ];
        let tree = build_tree("assembly", &elements, &["Assembly", "BuildingStep"]).unwrap();

        // Equal step values under different assemblies stay distinct.
        assert!(tree.get("A1/S1").is_some());
        assert!(tree.get("A2/S1").is_some());
        assert_eq!(
            tree.keys_with_tag(&NodeTag::Group("BuildingStep".into()))
                .len(),
            3
        );
        assert_eq!(tree.all_elements().len(), 3);
    }

    #[test]
    fn group_order_follows_element_order() {
        let elements = vec![
            element("w1", "A2", "S1"),
            element("w2", "A1", "S1"),
        ];
        let tree = build_tree("assembly", &elements, &["Assembly"]).unwrap();

        let assemblies: Vec<_> = tree
            .keys_with_tag(&NodeTag::Group("Assembly".into()))
            .into_iter()
            .map(|k| tree.node(k).unwrap().name().to_string())
            .collect();
        assert_eq!(assemblies, ["A2", "A1"]);
    }

    #[test]
    fn missing_property_goes_to_unspecified() {
        let elements = vec![
            element("w1", "A1", "S1"),
            Element::new("w2", "W2", "model-a", vec![2]).with_property("Assembly", "A1"),
        ];
        let tree = build_tree("assembly", &elements, &["Assembly", "BuildingStep"]).unwrap();

        let node = tree.get("A1/Unspecified").unwrap();
        assert_eq!(node.name(), UNSPECIFIED_GROUP);
        let key = tree.key_of("A1/Unspecified").unwrap();
        assert_eq!(tree.collect_elements(key).len(), 1);
    }

    #[test]
    fn duplicate_element_ids_are_suffixed() {
        let elements = vec![element("w1", "A1", "S1"), element("w1", "A1", "S2")];
        let tree = build_tree("assembly", &elements, &["Assembly", "BuildingStep"]).unwrap();

        assert!(tree.get("w1").is_some());
        assert!(tree.get("w1#2").is_some());
        // Both leaves still reference the same element id.
        assert_eq!(tree.get("w1#2").unwrap().element().unwrap().id, "w1");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            build_tree("assembly", &[], &["Assembly"]),
            Err(Error::NoElements(_))
        ));
        let elements = vec![element("w1", "A1", "S1")];
        assert!(matches!(
            build_tree("assembly", &elements, &[]),
            Err(Error::NoGroupingKeys(_))
        ));
    }
}
