//! Loading overlays.
//!
//! A loading overlay has no header or footer, only a spinner, a title and a
//! status line. When opened without a subtitle the status line is filled from
//! the configured message pool right away and re-picked on every interval
//! tick.
//!
//! [`Loading::element`] additionally anchors the overlay to a target element:
//! the dialog panel and a dedicated backdrop cover exactly the target's box,
//! the dialog is centered inside it, and both follow the target whenever it
//! resizes or the window scrolls or resizes.

mod messages;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bmodal_core::geometry::{anchor_layout, px, AnchorLayout};
use bmodal_core::{
    Callback, Document, DomError, ListenerId, NodeId, ObserverId, Platform, SharedDocument,
    TimerId, WindowEvent,
};

use crate::options::OverlayConfig;
use crate::overlay::{Overlay, OverlayError, OverlayHost};

pub use messages::STATUS_MESSAGES;

const LOADING_STYLE: &str = "\
.loading-content { min-width: 500px; }
.img-loading { width: 60px; height: 60px; }";

/// What a loading overlay displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingOptions {
    /// Title markup.
    pub title: String,
    /// Spinner image source; `None` uses the configured icon.
    pub icon: Option<String>,
    /// Fixed status line markup. Blank enables message rotation.
    pub subtitle: String,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            title: "Loading...".to_string(),
            icon: None,
            subtitle: String::new(),
        }
    }
}

impl LoadingOptions {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }
}

/// Platform registrations owned by one loading overlay.
#[derive(Debug, Default)]
struct Resources {
    interval: Option<TimerId>,
    observer: Option<ObserverId>,
    backdrop: Option<NodeId>,
    listeners: Vec<ListenerId>,
}

impl Resources {
    fn release(&mut self, platform: &dyn Platform, document: &SharedDocument) {
        if let Some(interval) = self.interval.take() {
            platform.clear_interval(interval);
        }
        if let Some(observer) = self.observer.take() {
            platform.disconnect(observer);
        }
        if let Some(backdrop) = self.backdrop.take() {
            document.borrow_mut().remove(backdrop);
        }
        for listener in self.listeners.drain(..) {
            platform.remove_window_listener(listener);
        }
    }
}

/// Elements kept in place over an anchoring target.
#[derive(Debug, Clone, Copy)]
struct AnchorFrame {
    target: NodeId,
    panel: NodeId,
    dialog: NodeId,
    backdrop: NodeId,
}

impl AnchorFrame {
    /// Cover the target with the panel and backdrop and center the dialog.
    fn sync(&self, doc: &mut Document) -> Result<AnchorLayout, DomError> {
        let layout = anchor_layout(
            doc.bounding_rect(self.target),
            doc.scroll_offset(),
            doc.offset_size(self.dialog),
        );
        let frame = layout.frame;
        for node in [self.panel, self.backdrop] {
            doc.set_style(node, "top", &px(frame.top))?;
            doc.set_style(node, "left", &px(frame.left))?;
            doc.set_style(node, "width", &px(frame.width))?;
            doc.set_style(node, "height", &px(frame.height))?;
        }
        doc.set_style(self.dialog, "position", "absolute")?;
        doc.set_style(self.dialog, "top", &px(layout.content_offset.y))?;
        doc.set_style(self.dialog, "left", &px(layout.content_offset.x))?;
        doc.set_style(self.dialog, "margin", "0")?;
        Ok(layout)
    }

    fn sync_shared(&self, document: &SharedDocument) {
        match self.sync(&mut document.borrow_mut()) {
            Ok(layout) => log::trace!("anchor resync: {:?}", layout.frame),
            Err(err) => log::trace!("anchor resync skipped: {err}"),
        }
    }
}

/// An open loading overlay.
#[derive(Debug)]
pub struct Loading {
    overlay: Overlay,
    status: NodeId,
    resources: Rc<RefCell<Resources>>,
}

impl Loading {
    /// Open a loading overlay over the whole viewport.
    pub fn screen(host: &Rc<OverlayHost>, options: LoadingOptions) -> Result<Self, OverlayError> {
        let document = host.document();
        let icon = options
            .icon
            .clone()
            .unwrap_or_else(|| host.config().loading.icon.clone());
        let (content, status) = build_content(&mut document.borrow_mut(), &options, &icon)?;

        let opened = Overlay::open(
            host,
            OverlayConfig::new()
                .with_content(content)
                .close_button(false)
                .display_header(false)
                .display_footer(false),
        );
        let overlay = match opened {
            Ok(overlay) => overlay,
            Err(err) => {
                document.borrow_mut().remove(content);
                return Err(err);
            }
        };

        let resources = Rc::new(RefCell::new(Resources::default()));
        {
            let resources = resources.clone();
            let platform = host.platform().clone();
            let document = document.clone();
            overlay.add_teardown(move || {
                resources.borrow_mut().release(platform.as_ref(), &document);
            });
        }

        let loading = Self {
            overlay,
            status,
            resources,
        };
        if options.subtitle.trim().is_empty() {
            loading.start_rotation(host);
        }
        Ok(loading)
    }

    /// Open a loading overlay anchored to `target`.
    ///
    /// `target` must stay in the document until the overlay is closed;
    /// a removed target is treated as a zero-sized box.
    pub fn element(
        host: &Rc<OverlayHost>,
        target: NodeId,
        options: LoadingOptions,
    ) -> Result<Self, OverlayError> {
        let loading = Self::screen(host, options)?;
        if let Err(err) = loading.restrict(target) {
            loading.close();
            return Err(err);
        }
        Ok(loading)
    }

    fn start_rotation(&self, host: &Rc<OverlayHost>) {
        let messages: Rc<[String]> = host.config().loading.messages.clone().into();
        if messages.is_empty() {
            return;
        }
        let platform = Rc::downgrade(host.platform());
        let document = host.document();
        let status = self.status;

        let rotate: Callback = Rc::new(move || {
            pick_status(&platform, &document, status, &messages);
        });
        rotate();
        let interval = host
            .platform()
            .set_interval(host.config().status_interval(), rotate);
        self.resources.borrow_mut().interval = Some(interval);
    }

    /// Pin the overlay to `target`.
    ///
    /// Requires the dialog to accept a substitute backdrop. When it refuses,
    /// the overlay stays a full-viewport loading screen and no observers are
    /// registered.
    fn restrict(&self, target: NodeId) -> Result<(), OverlayError> {
        let Some(surface) = self.overlay.surface() else {
            return Ok(());
        };
        let host = self.overlay.host().clone();
        let platform = host.platform().clone();
        let document = host.document();

        let backdrop = {
            let mut doc = document.borrow_mut();
            let body = doc.body();
            doc.set_style(body, "overflow", "visible")?;
            let backdrop = doc.create_element("div");
            doc.add_classes(backdrop, "modal-backdrop show")?;
            backdrop
        };

        let replaced = self
            .overlay
            .with_controller(|controller| controller.replace_backdrop(backdrop))
            .unwrap_or(false);
        if !replaced {
            document.borrow_mut().remove(backdrop);
            log::debug!(
                "overlay {}: dialog keeps its own backdrop, not anchoring",
                self.overlay.id()
            );
            return Ok(());
        }
        self.resources.borrow_mut().backdrop = Some(backdrop);

        let frame = AnchorFrame {
            target,
            panel: surface.panel,
            dialog: surface.dialog,
            backdrop,
        };
        {
            let mut doc = document.borrow_mut();
            let body = doc.body();
            doc.append_child(body, backdrop)?;
            doc.set_style(backdrop, "position", "absolute")?;
            doc.set_style(surface.panel, "position", "absolute")?;
            frame.sync(&mut doc)?;
        }
        host.refresh_layers();

        let resync: Callback = {
            let document = Rc::downgrade(&document);
            Rc::new(move || {
                if let Some(document) = document.upgrade() {
                    frame.sync_shared(&document);
                }
            })
        };
        let observer = platform.observe_resize(target, resync.clone());
        let on_scroll = platform.add_window_listener(WindowEvent::Scroll, resync.clone());
        let on_resize = platform.add_window_listener(WindowEvent::Resize, resync);

        let mut resources = self.resources.borrow_mut();
        resources.observer = Some(observer);
        resources.listeners.extend([on_scroll, on_resize]);
        log::debug!("overlay {} anchored to {target:?}", self.overlay.id());
        Ok(())
    }

    /// Close the overlay, releasing the timer, observer, backdrop and window
    /// listeners first.
    pub fn close(&self) {
        self.overlay.close();
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Element holding the status line.
    #[must_use]
    pub fn status_element(&self) -> NodeId {
        self.status
    }

    /// Current status line markup.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.overlay
            .host()
            .document()
            .borrow()
            .inner_markup(self.status)
    }

    /// Whether the overlay follows a target element.
    #[must_use]
    pub fn is_anchored(&self) -> bool {
        self.resources.borrow().backdrop.is_some()
    }

    /// Dedicated backdrop of an anchored overlay.
    #[must_use]
    pub fn backdrop(&self) -> Option<NodeId> {
        self.resources.borrow().backdrop
    }
}

fn pick_status(
    platform: &Weak<dyn Platform>,
    document: &SharedDocument,
    status: NodeId,
    messages: &[String],
) {
    let Some(platform) = platform.upgrade() else {
        return;
    };
    let Some(message) = messages.get(platform.random_index(messages.len())) else {
        return;
    };
    if let Err(err) = document.borrow_mut().set_inner_markup(status, message) {
        log::trace!("status rotated on a removed element: {err}");
        return;
    }
    log::trace!("status rotated: {message}");
}

/// Spinner, title and status line. Returns the content root and the status
/// element.
fn build_content(
    doc: &mut Document,
    options: &LoadingOptions,
    icon: &str,
) -> Result<(NodeId, NodeId), DomError> {
    let root = doc.create_element("div");
    let built = assemble_content(doc, root, options, icon);
    if built.is_err() {
        doc.remove(root);
    }
    built.map(|status| (root, status))
}

fn assemble_content(
    doc: &mut Document,
    root: NodeId,
    options: &LoadingOptions,
    icon: &str,
) -> Result<NodeId, DomError> {
    let style = child(doc, root, "style", "")?;
    doc.set_inner_markup(style, LOADING_STYLE)?;

    let content = child(doc, root, "div", "loading-content")?;
    let row = child(doc, content, "div", "row")?;

    let icon_column = child(doc, row, "div", "col-sm-2")?;
    let image = child(doc, icon_column, "img", "img-loading")?;
    doc.set_attribute(image, "src", icon)?;

    let text_column = child(doc, row, "div", "col-sm")?;
    let title_row = child(doc, text_column, "div", "row")?;
    let title_column = child(doc, title_row, "div", "col-sm")?;
    let title = child(doc, title_column, "h3", "m-0")?;
    doc.set_inner_markup(title, &options.title)?;

    let status_row = child(doc, text_column, "div", "row")?;
    let status_column = child(doc, status_row, "div", "col-sm")?;
    let status = child(doc, status_column, "span", "fw-light")?;
    doc.set_inner_markup(status, &options.subtitle)?;
    Ok(status)
}

fn child(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    classes: &str,
) -> Result<NodeId, DomError> {
    let node = doc.create_element(tag);
    doc.append_child(parent, node)?;
    doc.add_classes(node, classes)?;
    Ok(node)
}
