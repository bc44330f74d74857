// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end visibility flows: build a tree from element properties, drive
//! the manager through mode changes, and verify what reaches the mock scene
//! collaborators.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::Mutex;

use bim_view_state::{
    build_tree, Adjacency, Element, ElementRepository, FragmentMap, Highlighter, NodeTag, Rgba,
    SceneRenderer, SelectionGroup, VisibilityMode, VisibilityState, VisibilityTreeManager,
};

#[derive(Default)]
struct MockScene {
    shown: Vec<String>,
    hidden: Vec<String>,
    tinted: Vec<String>,
}

impl MockScene {
    fn reset(&mut self) {
        self.shown.clear();
        self.hidden.clear();
        self.tinted.clear();
    }

    fn collect(by_model: &FxHashMap<String, Vec<Element>>) -> Vec<String> {
        let mut ids: Vec<String> = by_model
            .values()
            .flatten()
            .map(|e| e.id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl SceneRenderer for MockScene {
    fn set_visibility(&mut self, by_model: &FxHashMap<String, Vec<Element>>, visible: bool) {
        let ids = Self::collect(by_model);
        if visible {
            self.shown.extend(ids);
        } else {
            self.hidden.extend(ids);
        }
    }

    fn set_color(&mut self, by_model: &FxHashMap<String, Vec<Element>>, color: Option<Rgba>) {
        if color.is_some() {
            self.tinted.extend(Self::collect(by_model));
        }
    }
}

fn wall(id: &str, model: &str, assembly: &str, step: &str, express_id: u64) -> Element {
    Element::new(id, format!("Wall {id}"), model, vec![express_id])
        .with_property("Assembly", assembly)
        .with_property("BuildingStep", step)
}

/// Two assemblies across two source models:
/// A1 → S1 {w1}, S2 {w2}; A2 → S1 {w3}. w3 lives in model-b.
fn sample_elements() -> Vec<Element> {
    vec![
        wall("w1", "model-a", "A1", "S1", 101),
        wall("w2", "model-a", "A1", "S2", 102),
        wall("w3", "model-b", "A2", "S1", 201),
    ]
}

fn sample_manager() -> VisibilityTreeManager {
    let tree = build_tree("assembly", &sample_elements(), &["Assembly", "BuildingStep"]).unwrap();
    let mut manager = VisibilityTreeManager::new();
    manager.add_tree(tree, None);
    assert!(manager.set_active("assembly"));
    manager
}

fn step(id: &str) -> SelectionGroup {
    SelectionGroup::new(id, NodeTag::Group("BuildingStep".into()))
}

#[test]
fn walking_the_sequence_with_show_previous() {
    let mut manager = sample_manager();
    let mut scene = MockScene::default();

    // Select the first step of the first assembly.
    manager.apply_mode(
        Some(&step("A1/S1")),
        Some(VisibilityMode::ShowPrevious),
        "assembly",
        &mut scene,
    );
    assert_eq!(scene.shown, ["w1"]);
    let mut hidden = scene.hidden.clone();
    hidden.sort();
    assert_eq!(hidden, ["w2", "w3"]);

    // Advance to the adjacent step and re-apply: predecessors stay visible.
    let next = manager
        .adjacent_group("assembly", &step("A1/S1"), Adjacency::Next)
        .unwrap();
    assert_eq!(next.node_id, "A1/S2");

    scene.reset();
    manager.apply_mode(
        Some(&next),
        Some(VisibilityMode::ShowPrevious),
        "assembly",
        &mut scene,
    );
    let mut shown = scene.shown.clone();
    shown.sort();
    assert_eq!(shown, ["w1", "w2"]);
    assert_eq!(scene.hidden, ["w3"]);
}

#[test]
fn ghosting_a_container_tints_its_subtree() {
    let mut manager = sample_manager();
    let mut scene = MockScene::default();

    manager.set_visibility("assembly", "A1", VisibilityState::Ghost, true, &mut scene);

    // Ghosted elements are shown but tinted; the untouched assembly stays
    // plain visible.
    let mut tinted = scene.tinted.clone();
    tinted.sort();
    assert_eq!(tinted, ["w1", "w2"]);
    assert!(scene.shown.contains(&"w3".to_string()));
    assert!(scene.hidden.is_empty());
}

#[test]
fn isolating_one_step_across_assemblies() {
    let mut manager = sample_manager();
    let mut scene = MockScene::default();

    manager.isolate(&step("A2/S1"), "assembly", &mut scene);

    assert_eq!(scene.shown, ["w3"]);
    let mut hidden = scene.hidden.clone();
    hidden.sort();
    assert_eq!(hidden, ["w1", "w2"]);

    let container = manager.tree("assembly").unwrap();
    assert_eq!(
        container.visibility.get("A1/S1"),
        Some(VisibilityState::Hidden)
    );
    assert_eq!(
        container.visibility.get("A2/S1"),
        Some(VisibilityState::Visible)
    );
    // Parent of the isolated step forced visible.
    assert_eq!(container.visibility.get("A2"), Some(VisibilityState::Visible));
}

#[test]
fn replacing_a_tree_resets_its_visibility() {
    let mut manager = sample_manager();
    let mut scene = MockScene::default();
    manager.set_visibility("assembly", "A1", VisibilityState::Hidden, false, &mut scene);

    // Rebuild under the same id: wholesale replacement, fresh default map.
    let tree = build_tree("assembly", &sample_elements(), &["Assembly", "BuildingStep"]).unwrap();
    manager.add_tree(tree, None);

    let container = manager.tree("assembly").unwrap();
    assert_eq!(container.visibility.get("A1"), Some(VisibilityState::Visible));
}

// --- Selection bridge against both models ---

#[derive(Default)]
struct LogHighlighter {
    log: Mutex<Vec<String>>,
}

#[async_trait]
impl Highlighter for LogHighlighter {
    async fn clear(&self, channel: &str) {
        self.log.lock().unwrap().push(format!("clear:{channel}"));
    }

    async fn highlight(&self, channel: &str, fragments: &FragmentMap, additive: bool, focus: bool) {
        assert!(!additive);
        assert!(!focus);
        let mut keys: Vec<_> = fragments.keys().cloned().collect();
        keys.sort();
        self.log
            .lock()
            .unwrap()
            .push(format!("highlight:{channel}:{}", keys.join(",")));
    }
}

struct Repo;

impl ElementRepository for Repo {
    fn contains_model(&self, model_id: &str) -> bool {
        model_id == "model-a" || model_id == "model-b"
    }

    fn resolve_fragments(&self, express_ids: &[u64], model_id: &str) -> Option<FragmentMap> {
        if !self.contains_model(model_id) {
            return None;
        }
        let mut map = FragmentMap::default();
        map.insert(format!("frag-{model_id}"), express_ids.to_vec());
        Some(map)
    }
}

#[tokio::test]
async fn selecting_the_root_highlights_both_models() {
    let manager = sample_manager();
    let highlighter = LogHighlighter::default();

    let root = SelectionGroup::new("assembly", NodeTag::Group("Root".into()));
    manager
        .select(&root, "assembly", &highlighter, &Repo)
        .await;

    let log = highlighter.log.lock().unwrap().clone();
    // Cleared exactly once, before any highlight; one call per model.
    assert_eq!(log.len(), 3);
    assert_eq!(log[0], "clear:select");
    assert!(log.contains(&"highlight:select:frag-model-a".to_string()));
    assert!(log.contains(&"highlight:select:frag-model-b".to_string()));
}
