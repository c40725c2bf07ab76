//! Host capabilities consumed by overlays.
//!
//! Overlays never talk to a real browser. They build their elements in the
//! platform's [`Document`](crate::Document), hand the dialog panel to a
//! [`DialogController`] that owns showing, hiding and the backdrop, and use the
//! remaining [`Platform`] methods for resize observation, window listeners,
//! repeating timers and randomness.

mod headless;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use slotmap::new_key_type;

use crate::dom::{DomError, NodeId, SharedDocument};

pub use headless::HeadlessPlatform;

new_key_type! {
    /// Registration of a resize observer.
    pub struct ObserverId;
    /// Registration of a window listener.
    pub struct ListenerId;
    /// A repeating timer.
    pub struct TimerId;
}

/// Callback invoked by the platform.
pub type Callback = Rc<dyn Fn()>;

/// How the dialog treats clicks on its backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backdrop {
    /// A click on the backdrop requests dismissal.
    #[default]
    Dismissable,
    /// The backdrop ignores clicks.
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    Scroll,
    Resize,
}

/// Construction options for a dialog.
#[derive(Clone, Default)]
pub struct DialogOptions {
    pub backdrop: Backdrop,
    /// Whether Escape requests dismissal.
    pub keyboard: bool,
    /// Invoked when the user requests dismissal through the backdrop or the
    /// keyboard. The dialog itself never hides in response; the owner decides.
    pub on_dismiss: Option<Callback>,
}

impl fmt::Debug for DialogOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogOptions")
            .field("backdrop", &self.backdrop)
            .field("keyboard", &self.keyboard)
            .field("on_dismiss", &self.on_dismiss.is_some())
            .finish()
    }
}

/// The dialog primitive wrapped by an overlay.
pub trait DialogController {
    /// Display the panel and insert a backdrop.
    fn show(&mut self) -> Result<(), DomError>;

    /// Hide the panel and remove the backdrop.
    fn hide(&mut self) -> Result<(), DomError>;

    /// Release the dialog. Hides first if still shown. Idempotent.
    fn dispose(&mut self);

    fn is_shown(&self) -> bool;

    /// The backdrop element currently paired with this dialog.
    fn backdrop(&self) -> Option<NodeId>;

    /// Substitute `backdrop` for the dialog's own backdrop, removing the
    /// previous one. The substitute stays paired across `hide`/`show`: hiding
    /// takes it out of the document without freeing it and showing puts it
    /// back. Returns `false` when the platform cannot do this or `backdrop` is
    /// not a live element, in which case nothing changed.
    fn replace_backdrop(&mut self, backdrop: NodeId) -> bool;
}

/// Everything an overlay needs from its host.
pub trait Platform {
    fn document(&self) -> SharedDocument;

    /// Create a dialog around `panel`. The panel must already be in the
    /// document.
    fn create_dialog(&self, panel: NodeId, options: DialogOptions) -> Box<dyn DialogController>;

    /// Call `callback` whenever the rendered size of `target` changes.
    fn observe_resize(&self, target: NodeId, callback: Callback) -> ObserverId;

    /// Stop an observer. Returns `false` if it was already disconnected.
    fn disconnect(&self, observer: ObserverId) -> bool;

    fn add_window_listener(&self, event: WindowEvent, callback: Callback) -> ListenerId;

    fn remove_window_listener(&self, listener: ListenerId) -> bool;

    /// Call `callback` every `period` until cleared.
    fn set_interval(&self, period: Duration, callback: Callback) -> TimerId;

    fn clear_interval(&self, timer: TimerId) -> bool;

    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    fn random_index(&self, len: usize) -> usize;
}
