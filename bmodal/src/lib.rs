//! bmodal - modal overlays on top of a dialog primitive
//!
//! Overlays are built as element trees in the host document, handed to a
//! [`DialogController`](bmodal_core::DialogController) for display, and kept
//! in a stack so that later overlays (and their backdrops) cover earlier ones.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::rc::Rc;
//!
//! use bmodal::{BModalConfig, ConfirmOptions, Overlay, OverlayHost};
//! use bmodal_core::HeadlessPlatform;
//!
//! fn main() -> anyhow::Result<()> {
//!     let platform = Rc::new(HeadlessPlatform::new());
//!     let host = OverlayHost::new(platform, BModalConfig::load_default()?);
//!     let overlay = Overlay::confirm(&host, "Delete receipt?", ConfirmOptions::default())?;
//!     overlay.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Everything is single threaded. The [`OverlayHost`] owns the platform and
//! the stacking tracker; an open [`Overlay`] stays alive in the tracker until
//! it is closed, so callers may drop their handle. Element callbacks only hold
//! weak references to overlays.
//!
//! [`Loading`] builds on a plain overlay and optionally anchors it to an
//! element, replacing the dialog's backdrop with one that covers only that
//! element.

// Public library modules
pub mod config;
pub mod loading;
pub mod options;
pub mod overlay;
pub mod presets;
pub mod surface;
pub mod tracker;

#[cfg(test)]
mod test_helpers;

// Convenience re-exports
pub use config::BModalConfig;
pub use loading::{Loading, LoadingOptions};
pub use options::{
    Action, Color, Fragment, ModalSize, OverlayConfig, OverlayListener, OverlayOptions,
};
pub use overlay::{Overlay, OverlayError, OverlayHost, OverlayId, Phase, WeakOverlay};
pub use presets::ConfirmOptions;
