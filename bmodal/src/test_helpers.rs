//! Test helpers for overlay tests.
//!
//! Every test drives its own [`HeadlessPlatform`], so tests are independent
//! and deterministic and can run in parallel.

use std::cell::RefCell;
use std::rc::Rc;

use bmodal_core::{Document, HeadlessPlatform, NodeId, Platform, Rect};

use crate::config::BModalConfig;
use crate::options::OverlayListener;
use crate::overlay::{Overlay, OverlayHost};

/// A host with default configuration over a seeded headless platform.
pub fn headless_host() -> (Rc<HeadlessPlatform>, Rc<OverlayHost>) {
    headless_host_with(HeadlessPlatform::with_seed(7), BModalConfig::default())
}

pub fn headless_host_with(
    platform: HeadlessPlatform,
    config: BModalConfig,
) -> (Rc<HeadlessPlatform>, Rc<OverlayHost>) {
    let platform = Rc::new(platform);
    let host = OverlayHost::new(platform.clone() as Rc<dyn Platform>, config);
    (platform, host)
}

/// Records lifecycle hooks, and anything pushed by the test, in order.
#[derive(Debug, Default)]
pub struct Recorder {
    events: RefCell<Vec<String>>,
}

impl Recorder {
    pub fn push(&self, event: &str) {
        self.events.borrow_mut().push(event.to_string());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

impl OverlayListener for Recorder {
    fn on_opening(&self, _overlay: &Overlay) {
        self.push("opening");
    }

    fn on_opened(&self, _overlay: &Overlay) {
        self.push("opened");
    }

    fn on_closing(&self, _overlay: &Overlay) {
        self.push("closing");
    }

    fn on_closed(&self, _overlay: &Overlay) {
        self.push("closed");
    }

    fn on_show(&self, _overlay: &Overlay) {
        self.push("show");
    }

    fn on_hide(&self, _overlay: &Overlay) {
        self.push("hide");
    }
}

/// Parsed `z-index` of `node`.
pub fn z_index(doc: &Document, node: NodeId) -> Option<i32> {
    doc.style(node, "z-index")?.parse().ok()
}

/// Footer button of `overlay` whose markup mentions `label`.
pub fn button_labeled(host: &OverlayHost, overlay: &Overlay, label: &str) -> Option<NodeId> {
    let footer = overlay.surface()?.footer?;
    let document = host.document();
    let doc = document.borrow();
    doc.children(footer)
        .iter()
        .copied()
        .find(|&button| doc.to_html(button).contains(label))
}

/// A `div` in the body laid out at `rect`.
pub fn mounted_target(host: &OverlayHost, rect: Rect) -> NodeId {
    let document = host.document();
    let mut doc = document.borrow_mut();
    let target = doc.create_element("div");
    let body = doc.body();
    doc.append_child(body, target).expect("body accepts children");
    doc.set_bounding_rect(target, rect).expect("target is an element");
    target
}
