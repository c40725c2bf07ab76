//! Arena-backed element tree.
//!
//! `Document` models the parts of a page the overlay system touches: element
//! nodes with classes, attributes, inline style and click listeners, raw
//! markup chunks inserted verbatim, and the client rectangle each element was
//! laid out at. Nodes live in a slot map and are addressed by [`NodeId`]; a
//! removed node's id simply stops resolving.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::geometry::{Point, Rect, Size};

new_key_type! {
    /// Handle to a node of a [`Document`].
    pub struct NodeId;
}

/// A document shared between the overlay system and the platform.
pub type SharedDocument = Rc<RefCell<Document>>;

/// Click listener attached to an element.
pub type ClickListener = Rc<dyn Fn()>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0:?} is not part of the document")]
    Detached(NodeId),
    #[error("node {0:?} is a markup chunk, not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} cannot be appended inside its own subtree")]
    Cycle(NodeId),
}

/// Elements that serialize without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

enum NodeKind {
    Element(Element),
    Markup(String),
}

#[derive(Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    children: Vec<NodeId>,
    listeners: Vec<ClickListener>,
    rect: Rect,
}

pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    body: NodeId,
    scroll: Point,
    viewport: Size,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("scroll", &self.scroll)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Create a document holding an empty `body` sized to a 1280x800 viewport.
    #[must_use]
    pub fn new() -> Self {
        let viewport = Size::new(1280.0, 800.0);
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(Node {
            parent: None,
            kind: NodeKind::Element(Element {
                tag: "body".to_string(),
                rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
                ..Element::default()
            }),
        });
        Self {
            nodes,
            body,
            scroll: Point::default(),
            viewport,
        }
    }

    #[must_use]
    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            kind: NodeKind::Element(Element {
                tag: tag.to_string(),
                ..Element::default()
            }),
        })
    }

    /// Create a detached chunk of raw markup. The text is emitted verbatim.
    pub fn create_markup(&mut self, markup: impl Into<String>) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            kind: NodeKind::Markup(markup.into()),
        })
    }

    /// Live nodes, attached or not, including the body.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `node` still exists (attached or not).
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Whether `node` is reachable from the body.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.element(node)
            .map_or(&[][..], |e| e.children.as_slice())
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).ok().map(|e| e.tag.as_str())
    }

    /// Append `child` as the last child of `parent`, moving it out of its
    /// current parent if it has one.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        if !self.contains(child) {
            return Err(DomError::Detached(child));
        }
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(DomError::Cycle(child));
            }
            ancestor = self.parent(id);
        }

        self.unlink(child);
        self.element_mut(parent)?.children.push(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Remove `node` and its whole subtree. Returns `false` if the node was
    /// already gone.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if !self.contains(node) || node == self.body {
            return false;
        }
        self.unlink(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(removed) = self.nodes.remove(id) {
                if let NodeKind::Element(element) = removed.kind {
                    pending.extend(element.children);
                }
            }
        }
        true
    }

    /// Take `node` out of its parent, keeping it and its subtree alive so it
    /// can be appended again. Returns `false` if it had no parent.
    pub fn detach(&mut self, node: NodeId) -> bool {
        if node == self.body {
            return false;
        }
        if self.parent(node).is_none() {
            return false;
        }
        self.unlink(node);
        true
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Ok(element) = self.element_mut(parent) {
            element.children.retain(|&c| c != node);
        }
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(node)?;
        if !element.classes.iter().any(|c| c == class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    /// Add every whitespace separated class of `classes`.
    pub fn add_classes(&mut self, node: NodeId, classes: &str) -> Result<(), DomError> {
        for class in classes.split_whitespace() {
            self.add_class(node, class)?;
        }
        Ok(())
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(node)?.classes.retain(|c| c != class);
        Ok(())
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node)
            .is_ok_and(|e| e.classes.iter().any(|c| c == class))
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.element(node)
            .map_or(&[][..], |e| e.classes.as_slice())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .ok()
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?
            .style
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) -> Result<(), DomError> {
        self.element_mut(node)?.style.remove(property);
        Ok(())
    }

    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)
            .ok()
            .and_then(|e| e.style.get(property))
            .map(String::as_str)
    }

    /// Replace the children of `node` with a single markup chunk.
    pub fn set_inner_markup(&mut self, node: NodeId, markup: &str) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.element_mut(node)?.children);
        for child in children {
            if let Some(n) = self.nodes.get_mut(child) {
                n.parent = None;
            }
            self.remove(child);
        }
        if !markup.is_empty() {
            let chunk = self.create_markup(markup);
            self.append_child(node, chunk)?;
        }
        Ok(())
    }

    /// Serialized children of `node`.
    #[must_use]
    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize `node` and its subtree.
    #[must_use]
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node) else {
            return;
        };
        let element = match &n.kind {
            NodeKind::Markup(markup) => {
                out.push_str(markup);
                return;
            }
            NodeKind::Element(element) => element,
        };

        let _ = write!(out, "<{}", element.tag);
        if !element.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_attribute(&element.classes.join(" ")));
        }
        for (name, value) in &element.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
        }
        if !element.style.is_empty() {
            let style = element
                .style
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape_attribute(&style));
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&element.tag.as_str()) {
            return;
        }
        for &child in &element.children {
            self.write_html(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    /// First descendant of `root` (excluding `root`) carrying `class`, in
    /// document order.
    #[must_use]
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&id| self.has_class(id, class))
    }

    /// Every descendant of `root` carrying `class`, in document order.
    #[must_use]
    pub fn find_all_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.has_class(id, class))
            .collect()
    }

    /// Descendants of `root` in pre-order, `root` excluded.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            found.push(id);
            pending.extend(self.children(id).iter().rev().copied());
        }
        found
    }

    pub fn add_click_listener(&mut self, node: NodeId, listener: ClickListener) -> Result<(), DomError> {
        self.element_mut(node)?.listeners.push(listener);
        Ok(())
    }

    /// Dispatch a click on `node`. Listeners run after the document borrow is
    /// released, so they are free to mutate the document (including removing
    /// `node`). Returns whether any listener ran.
    pub fn click(document: &SharedDocument, node: NodeId) -> bool {
        let listeners = document
            .borrow()
            .element(node)
            .map(|e| e.listeners.clone())
            .unwrap_or_default();
        for listener in &listeners {
            listener();
        }
        !listeners.is_empty()
    }

    /// Record the viewport-relative box `node` was laid out at.
    pub fn set_bounding_rect(&mut self, node: NodeId, rect: Rect) -> Result<(), DomError> {
        self.element_mut(node)?.rect = rect;
        Ok(())
    }

    /// Viewport-relative box of `node`; the zero box for removed nodes, like a
    /// browser reports for detached elements.
    #[must_use]
    pub fn bounding_rect(&self, node: NodeId) -> Rect {
        self.element(node).map_or(Rect::ZERO, |e| e.rect)
    }

    /// Rendered size of `node`.
    #[must_use]
    pub fn offset_size(&self, node: NodeId) -> Size {
        self.bounding_rect(node).size()
    }

    #[must_use]
    pub fn scroll_offset(&self) -> Point {
        self.scroll
    }

    pub fn set_scroll_offset(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let body = self.body;
        if let Ok(element) = self.element_mut(body) {
            element.rect = Rect::new(0.0, 0.0, viewport.width, viewport.height);
        }
    }

    fn element(&self, node: NodeId) -> Result<&Element, DomError> {
        match self.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            Some(NodeKind::Markup(_)) => Err(DomError::NotAnElement(node)),
            None => Err(DomError::Detached(node)),
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        match self.nodes.get_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            Some(NodeKind::Markup(_)) => Err(DomError::NotAnElement(node)),
            None => Err(DomError::Detached(node)),
        }
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
