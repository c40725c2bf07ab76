//! Layering of open overlays.
//!
//! Overlays are kept in open order. The overlay at position `i` gets layer
//! `base_layer + i * layer_step` on its root and panel, and its own backdrop
//! (as reported by its dialog controller) gets the layer just below. Later
//! overlays therefore cover earlier ones together with their backdrops.

use bmodal_core::{Document, NodeId};

use crate::config::StackingConfig;
use crate::overlay::{Overlay, OverlayId};

/// Ordered registry of open overlays.
#[derive(Debug)]
pub struct StackingTracker {
    base_layer: i32,
    layer_step: i32,
    open: Vec<Overlay>,
}

impl Default for StackingTracker {
    fn default() -> Self {
        Self::new(StackingConfig::default())
    }
}

/// Elements of one overlay that receive a layer.
struct Layered {
    root: Option<NodeId>,
    panel: Option<NodeId>,
    backdrop: Option<NodeId>,
}

impl StackingTracker {
    #[must_use]
    pub fn new(config: StackingConfig) -> Self {
        Self {
            base_layer: config.base_layer,
            layer_step: config.layer_step,
            open: Vec::new(),
        }
    }

    /// Register a freshly opened overlay on top of the stack.
    pub fn track_open(&mut self, overlay: Overlay, doc: &mut Document) {
        self.open.push(overlay);
        self.recompute(doc);
    }

    /// Deregister `overlay`. Returns `false` when it was not tracked.
    pub fn track_close(&mut self, overlay: &Overlay, doc: &mut Document) -> bool {
        let Some(index) = self.open.iter().position(|open| open == overlay) else {
            return false;
        };
        self.open.remove(index);
        self.recompute(doc);
        true
    }

    /// Layer of the overlay at `index` in open order.
    #[must_use]
    pub fn layer_at(&self, index: usize) -> i32 {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        self.base_layer
            .saturating_add(index.saturating_mul(self.layer_step))
    }

    #[must_use]
    pub fn layer_of(&self, id: OverlayId) -> Option<i32> {
        self.open
            .iter()
            .position(|overlay| overlay.id() == id)
            .map(|index| self.layer_at(index))
    }

    /// Ids of the open overlays, bottom first.
    #[must_use]
    pub fn ids(&self) -> Vec<OverlayId> {
        self.open.iter().map(Overlay::id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Reassign every layer.
    pub fn recompute(&self, doc: &mut Document) {
        let layered: Vec<Layered> = self
            .open
            .iter()
            .map(|overlay| {
                let surface = overlay.surface();
                Layered {
                    root: surface.map(|s| s.root),
                    panel: surface.map(|s| s.panel),
                    backdrop: overlay.backdrop(),
                }
            })
            .collect();

        for (index, entry) in layered.into_iter().enumerate() {
            let layer = self.layer_at(index);
            let value = layer.to_string();
            for node in [entry.root, entry.panel].into_iter().flatten() {
                // A node removed behind our back keeps no layer.
                let _ = doc.set_style(node, "z-index", &value);
            }
            if let Some(backdrop) = entry.backdrop {
                let _ = doc.set_style(backdrop, "z-index", &(layer - 1).to_string());
            }
        }
        log::debug!("recomputed layers for {} overlays", self.open.len());
    }
}
