// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collaborator contracts: scene renderer, highlighter, element repository.
//!
//! The manager owns no rendering state of its own. Everything that touches
//! the 3D scene goes through these traits, so the visibility logic stays
//! testable against mocks and the real toolkit bindings live outside this
//! crate.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Renderable fragment handles per source model: fragment id → geometry ids
/// within that fragment.
pub type FragmentMap = FxHashMap<String, Vec<u64>>;

/// RGBA color used for de-emphasis tinting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    /// Translucent white used for ghosted elements.
    pub const GHOST: Rgba = Rgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 0.3,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Sets mesh visibility and color in the 3D scene. Inputs arrive pre-grouped
/// by source model id.
pub trait SceneRenderer {
    /// Shows or hides the given elements.
    fn set_visibility(&mut self, by_model: &FxHashMap<String, Vec<Element>>, visible: bool);

    /// Tints the given elements, or resets them to their original color when
    /// `color` is `None`.
    fn set_color(&mut self, by_model: &FxHashMap<String, Vec<Element>>, color: Option<Rgba>);
}

/// Drives 3D highlight state from resolved fragment handles.
#[async_trait]
pub trait Highlighter: Send + Sync {
    /// Clears the given highlight channel.
    async fn clear(&self, channel: &str);

    /// Highlights the given fragments on a channel. `additive` keeps the
    /// existing highlight set; `focus` moves the camera to the selection.
    async fn highlight(&self, channel: &str, fragments: &FragmentMap, additive: bool, focus: bool);
}

/// Resolves element identifiers to renderable fragment handles, per source
/// model.
pub trait ElementRepository: Send + Sync {
    /// Returns `true` if the model is loaded.
    fn contains_model(&self, model_id: &str) -> bool;

    /// Resolves geometry ids to fragment handles within one model. Returns
    /// `None` when the model is unknown or carries no element data.
    fn resolve_fragments(&self, express_ids: &[u64], model_id: &str) -> Option<FragmentMap>;
}
