//! Element tree of an overlay.
//!
//! ```text
//! div                                   root
//! ├── style
//! └── div.modal.shadow[tabindex=-1]     panel
//!     └── div.modal-dialog.<size>       dialog
//!         └── div.modal-content         content
//!             ├── div.modal-header      (displayHeader)
//!             ├── div.modal-body        (displayContent)
//!             └── div.modal-footer      (displayFooter, actions non-empty)
//! ```

use std::rc::Rc;

use bmodal_core::{Document, DomError, NodeId};

use crate::options::{Action, Fragment, OverlayOptions};
use crate::overlay::WeakOverlay;

pub(crate) const SURFACE_STYLE: &str = "\
.modal-header, .modal-footer { padding: 0.5rem 1rem; }
.modal-header h5 { padding: 0; margin: 0; }
.modal-header span { position: absolute; right: 1rem; font-size: 1.2rem; cursor: pointer; }
.modal-footer button { margin: 0 2pt; }";

/// Icon classes of the header dismiss glyph.
pub const CLOSE_GLYPH: &str = "fa-solid fa-xmark fa-fw";

/// Handles to the elements of a mounted overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub root: NodeId,
    /// The `.modal` element handed to the dialog primitive.
    pub panel: NodeId,
    /// The `.modal-dialog` box centered inside the panel.
    pub dialog: NodeId,
    pub content: NodeId,
    pub header: Option<NodeId>,
    pub body: Option<NodeId>,
    pub footer: Option<NodeId>,
}

pub(crate) struct SurfaceParts {
    pub title: Fragment,
    pub content: Fragment,
    pub actions: Vec<Action>,
}

/// Build the detached element tree. Nothing is left behind on error.
pub(crate) fn build(
    doc: &mut Document,
    options: &OverlayOptions,
    parts: SurfaceParts,
    owner: &WeakOverlay,
) -> Result<Surface, DomError> {
    let root = doc.create_element("div");
    let built = assemble(doc, root, options, parts, owner);
    if built.is_err() {
        doc.remove(root);
    }
    built
}

fn assemble(
    doc: &mut Document,
    root: NodeId,
    options: &OverlayOptions,
    parts: SurfaceParts,
    owner: &WeakOverlay,
) -> Result<Surface, DomError> {
    let style = doc.create_element("style");
    doc.append_child(root, style)?;
    doc.set_inner_markup(style, SURFACE_STYLE)?;

    let panel = doc.create_element("div");
    doc.append_child(root, panel)?;
    doc.add_classes(panel, "modal shadow")?;
    doc.set_attribute(panel, "tabindex", "-1")?;

    let dialog = doc.create_element("div");
    doc.append_child(panel, dialog)?;
    doc.add_class(dialog, "modal-dialog")?;
    doc.add_classes(dialog, options.size.class())?;

    let content = doc.create_element("div");
    doc.append_child(dialog, content)?;
    doc.add_class(content, "modal-content")?;

    let SurfaceParts {
        title,
        content: body_content,
        actions,
    } = parts;

    // Each part is attached before it is filled so a failure leaves nothing
    // outside `root`.
    let header = if options.display_header {
        Some(header(doc, content, options, title, owner)?)
    } else {
        None
    };
    let body = if options.display_content {
        Some(body(doc, content, body_content)?)
    } else {
        None
    };
    let footer = if options.display_footer && !actions.is_empty() {
        Some(footer(doc, content, actions, owner)?)
    } else {
        None
    };

    Ok(Surface {
        root,
        panel,
        dialog,
        content,
        header,
        body,
        footer,
    })
}

fn insert_fragment(doc: &mut Document, parent: NodeId, fragment: Fragment) -> Result<(), DomError> {
    match fragment {
        Fragment::Markup(markup) => doc.set_inner_markup(parent, &markup),
        Fragment::Element(element) => doc.append_child(parent, element),
    }
}

fn header(
    doc: &mut Document,
    parent: NodeId,
    options: &OverlayOptions,
    title: Fragment,
    owner: &WeakOverlay,
) -> Result<NodeId, DomError> {
    let header = doc.create_element("div");
    doc.append_child(parent, header)?;
    doc.add_class(header, "modal-header")?;
    doc.add_class(header, &options.color.header_class())?;

    let heading = doc.create_element("h5");
    doc.append_child(header, heading)?;
    insert_fragment(doc, heading, title)?;

    if options.close_button {
        let glyph = doc.create_element("span");
        doc.append_child(header, glyph)?;
        doc.add_classes(glyph, CLOSE_GLYPH)?;
        let owner = owner.clone();
        doc.add_click_listener(
            glyph,
            Rc::new(move || {
                if let Some(overlay) = owner.upgrade() {
                    overlay.close();
                }
            }),
        )?;
    }
    Ok(header)
}

fn body(doc: &mut Document, parent: NodeId, content: Fragment) -> Result<NodeId, DomError> {
    let body = doc.create_element("div");
    doc.append_child(parent, body)?;
    doc.add_class(body, "modal-body")?;
    insert_fragment(doc, body, content)?;
    Ok(body)
}

fn footer(
    doc: &mut Document,
    parent: NodeId,
    actions: Vec<Action>,
    owner: &WeakOverlay,
) -> Result<NodeId, DomError> {
    let footer = doc.create_element("div");
    doc.append_child(parent, footer)?;
    doc.add_class(footer, "modal-footer")?;

    for action in actions {
        let button = doc.create_element("button");
        doc.append_child(footer, button)?;
        doc.set_attribute(button, "type", "button")?;
        doc.add_class(button, "btn")?;
        doc.add_class(button, &action.color.button_class())?;

        if action.has_icon() {
            let icon = doc.create_element("span");
            doc.append_child(button, icon)?;
            doc.add_classes(icon, &action.icon)?;
        }
        let label = doc.create_markup(action.title.clone());
        doc.append_child(button, label)?;

        let owner = owner.clone();
        doc.add_click_listener(
            button,
            Rc::new(move || {
                if let Some(overlay) = owner.upgrade() {
                    action.run(&overlay);
                }
            }),
        )?;
    }
    Ok(footer)
}
