//! Overlay instances and the host they open on.
//!
//! An [`Overlay`] is open as soon as it is constructed and closes exactly once.
//! While open it owns a mounted element tree ([`Surface`]) and a platform
//! [`DialogController`]; after [`Overlay::close`] both are gone and the
//! instance is inert. Closed overlays cannot be reopened.
//!
//! Every overlay belongs to an [`OverlayHost`], created once per application,
//! which carries the platform, the configuration and the stacking tracker.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use bmodal_core::{
    Backdrop, Callback, DialogController, DialogOptions, DomError, NodeId, Platform,
    SharedDocument,
};
use thiserror::Error;

use crate::config::BModalConfig;
use crate::options::{OverlayConfig, OverlayListener, OverlayOptions};
use crate::surface::{self, Surface, SurfaceParts};
use crate::tracker::StackingTracker;

/// Identifier of an overlay, unique per host.
pub type OverlayId = u64;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("document operation failed: {0}")]
    Dom(#[from] DomError),
}

/// Lifecycle phase of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `on_opening` has run; the surface is being built and mounted.
    Constructing,
    Open,
    /// Terminal.
    Closed,
}

/// Shared services for every overlay of an application.
pub struct OverlayHost {
    platform: Rc<dyn Platform>,
    config: BModalConfig,
    tracker: RefCell<StackingTracker>,
    next_id: Cell<OverlayId>,
}

impl fmt::Debug for OverlayHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayHost")
            .field("config", &self.config)
            .field("open", &self.tracker.borrow().ids())
            .finish_non_exhaustive()
    }
}

impl OverlayHost {
    #[must_use]
    pub fn new(platform: Rc<dyn Platform>, config: BModalConfig) -> Rc<Self> {
        let tracker = StackingTracker::new(config.stacking);
        Rc::new(Self {
            platform,
            config,
            tracker: RefCell::new(tracker),
            next_id: Cell::new(1),
        })
    }

    #[must_use]
    pub fn platform(&self) -> &Rc<dyn Platform> {
        &self.platform
    }

    #[must_use]
    pub fn document(&self) -> SharedDocument {
        self.platform.document()
    }

    #[must_use]
    pub fn config(&self) -> &BModalConfig {
        &self.config
    }

    /// Open an overlay on this host.
    pub fn open(self: &Rc<Self>, config: OverlayConfig) -> Result<Overlay, OverlayError> {
        Overlay::open(self, config)
    }

    /// Ids of the open overlays, bottom first.
    #[must_use]
    pub fn open_overlays(&self) -> Vec<OverlayId> {
        self.tracker.borrow().ids()
    }

    /// Current layer of `overlay`, if it is open.
    #[must_use]
    pub fn layer_of(&self, overlay: &Overlay) -> Option<i32> {
        self.tracker.borrow().layer_of(overlay.id())
    }

    /// Reassign layers, e.g. after a dialog changed its backdrop.
    pub fn refresh_layers(&self) {
        let document = self.document();
        self.tracker.borrow().recompute(&mut document.borrow_mut());
    }

    fn allocate_id(&self) -> OverlayId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn track_open(&self, overlay: &Overlay) {
        let document = self.document();
        self.tracker
            .borrow_mut()
            .track_open(overlay.clone(), &mut document.borrow_mut());
    }

    fn track_close(&self, overlay: &Overlay) -> bool {
        let document = self.document();
        let closed = self
            .tracker
            .borrow_mut()
            .track_close(overlay, &mut document.borrow_mut());
        closed
    }
}

struct OverlayInner {
    id: OverlayId,
    host: Rc<OverlayHost>,
    options: OverlayOptions,
    listener: Option<Rc<dyn OverlayListener>>,
    state: RefCell<OverlayState>,
}

struct OverlayState {
    phase: Phase,
    surface: Option<Surface>,
    controller: Option<Box<dyn DialogController>>,
    teardown: Vec<Box<dyn FnOnce()>>,
}

/// Handle to an open (or closed) overlay. Clones refer to the same overlay.
#[derive(Clone)]
pub struct Overlay {
    inner: Rc<OverlayInner>,
}

/// Non-owning handle, held by callbacks wired into the document.
#[derive(Clone, Default)]
pub struct WeakOverlay {
    inner: Weak<OverlayInner>,
}

impl WeakOverlay {
    #[must_use]
    pub fn upgrade(&self) -> Option<Overlay> {
        self.inner.upgrade().map(|inner| Overlay { inner })
    }
}

impl PartialEq for Overlay {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Overlay {}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Overlay")
            .field("id", &self.inner.id)
            .field("phase", &state.phase)
            .field("surface", &state.surface)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl Overlay {
    /// Build, mount and display an overlay.
    ///
    /// `on_opening` runs before anything is mounted, then the surface is
    /// built and appended to the body, the dialog is created and shown,
    /// `on_opened` runs and the overlay is registered with the host's tracker.
    pub fn open(host: &Rc<OverlayHost>, config: OverlayConfig) -> Result<Self, OverlayError> {
        let OverlayConfig {
            overrides,
            title,
            content,
            actions,
            listener,
        } = config;
        let options = OverlayOptions::resolve([&host.config().overlay, &overrides]);

        let overlay = Self {
            inner: Rc::new(OverlayInner {
                id: host.allocate_id(),
                host: host.clone(),
                options,
                listener,
                state: RefCell::new(OverlayState {
                    phase: Phase::Constructing,
                    surface: None,
                    controller: None,
                    teardown: Vec::new(),
                }),
            }),
        };
        overlay.notify(|listener, overlay| listener.on_opening(overlay));

        let document = host.document();
        let surface = {
            let mut doc = document.borrow_mut();
            let surface = surface::build(
                &mut doc,
                &overlay.inner.options,
                SurfaceParts {
                    title,
                    content,
                    actions,
                },
                &overlay.downgrade(),
            )?;
            let body = doc.body();
            if let Err(err) = doc.append_child(body, surface.root) {
                doc.remove(surface.root);
                return Err(err.into());
            }
            surface
        };
        overlay.inner.state.borrow_mut().surface = Some(surface);

        let on_dismiss: Callback = {
            let owner = overlay.downgrade();
            Rc::new(move || {
                if let Some(overlay) = owner.upgrade() {
                    log::debug!("overlay {} dismissed by the user", overlay.id());
                    overlay.close();
                }
            })
        };
        let options = overlay.options();
        let mut controller = host.platform().create_dialog(
            surface.panel,
            DialogOptions {
                backdrop: if options.close_click {
                    Backdrop::Dismissable
                } else {
                    Backdrop::Static
                },
                keyboard: options.close_escape,
                on_dismiss: Some(on_dismiss),
            },
        );
        if let Err(err) = controller.show() {
            controller.dispose();
            document.borrow_mut().remove(surface.root);
            overlay.inner.state.borrow_mut().surface = None;
            return Err(err.into());
        }
        {
            let mut state = overlay.inner.state.borrow_mut();
            state.controller = Some(controller);
            state.phase = Phase::Open;
        }
        log::debug!("overlay {} opened", overlay.id());

        overlay.notify(|listener, overlay| listener.on_opened(overlay));
        // `on_opened` may already have closed it.
        if overlay.is_open() {
            host.track_open(&overlay);
        }
        Ok(overlay)
    }

    /// Close the overlay. Only the first call on an open overlay does
    /// anything.
    ///
    /// Registered teardown steps run first, then `on_closing`, then the
    /// dialog is hidden and disposed and the element tree removed, then
    /// `on_closed`; finally the overlay leaves the tracker.
    pub fn close(&self) {
        let teardown = {
            let mut state = self.inner.state.borrow_mut();
            if state.phase != Phase::Open {
                return;
            }
            state.phase = Phase::Closed;
            std::mem::take(&mut state.teardown)
        };
        for step in teardown {
            step();
        }

        self.notify(|listener, overlay| listener.on_closing(overlay));

        let controller = self.inner.state.borrow_mut().controller.take();
        if let Some(mut controller) = controller {
            if let Err(err) = controller.hide() {
                log::warn!("overlay {}: hiding dialog failed: {err}", self.id());
            }
            controller.dispose();
        }
        let surface = self.inner.state.borrow_mut().surface.take();
        if let Some(surface) = surface {
            self.inner.host.document().borrow_mut().remove(surface.root);
        }

        self.notify(|listener, overlay| listener.on_closed(overlay));
        self.inner.host.track_close(self);
        log::debug!("overlay {} closed", self.id());
    }

    /// Display the dialog again after [`Overlay::hide`].
    pub fn show(&self) -> Result<(), OverlayError> {
        if !self.toggle(true)? {
            return Ok(());
        }
        self.notify(|listener, overlay| listener.on_show(overlay));
        self.inner.host.refresh_layers();
        Ok(())
    }

    /// Hide the dialog. The overlay stays open and registered.
    pub fn hide(&self) -> Result<(), OverlayError> {
        if !self.toggle(false)? {
            return Ok(());
        }
        self.notify(|listener, overlay| listener.on_hide(overlay));
        self.inner.host.refresh_layers();
        Ok(())
    }

    fn toggle(&self, visible: bool) -> Result<bool, DomError> {
        let mut state = self.inner.state.borrow_mut();
        if state.phase != Phase::Open {
            return Ok(false);
        }
        let Some(controller) = state.controller.as_mut() else {
            return Ok(false);
        };
        if visible {
            controller.show()?;
        } else {
            controller.hide()?;
        }
        Ok(true)
    }

    /// Register a step to run at the start of [`Overlay::close`], before
    /// `on_closing`. On an overlay that is already closed the step runs
    /// immediately.
    pub fn add_teardown(&self, step: impl FnOnce() + 'static) {
        let mut state = self.inner.state.borrow_mut();
        if state.phase == Phase::Closed {
            drop(state);
            step();
        } else {
            state.teardown.push(Box::new(step));
        }
    }

    /// Run `f` with the dialog controller, if the overlay still has one.
    ///
    /// `f` must not call back into this overlay.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut dyn DialogController) -> R) -> Option<R> {
        let mut state = self.inner.state.borrow_mut();
        state.controller.as_mut().map(|controller| f(controller.as_mut()))
    }

    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.inner.id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.phase() == Phase::Open
    }

    /// Whether the dialog is currently displayed.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.inner
            .state
            .borrow()
            .controller
            .as_ref()
            .is_some_and(|controller| controller.is_shown())
    }

    /// Root element; `None` once closed.
    #[must_use]
    pub fn element(&self) -> Option<NodeId> {
        self.surface().map(|surface| surface.root)
    }

    /// Mounted elements; `None` once closed.
    #[must_use]
    pub fn surface(&self) -> Option<Surface> {
        self.inner.state.borrow().surface
    }

    /// Backdrop currently paired with the dialog.
    #[must_use]
    pub fn backdrop(&self) -> Option<NodeId> {
        self.inner
            .state
            .borrow()
            .controller
            .as_ref()
            .and_then(|controller| controller.backdrop())
    }

    /// Whether a dialog controller is attached; `false` once closed.
    #[must_use]
    pub fn has_controller(&self) -> bool {
        self.inner.state.borrow().controller.is_some()
    }

    #[must_use]
    pub fn options(&self) -> &OverlayOptions {
        &self.inner.options
    }

    #[must_use]
    pub fn host(&self) -> &Rc<OverlayHost> {
        &self.inner.host
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakOverlay {
        WeakOverlay {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn notify(&self, hook: impl FnOnce(&dyn OverlayListener, &Self)) {
        if let Some(listener) = self.inner.listener.clone() {
            hook(listener.as_ref(), self);
        }
    }
}
