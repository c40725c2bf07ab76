//! Core primitives for the bmodal overlay system.
//!
//! This crate has no knowledge of overlays themselves. It provides the
//! building blocks the `bmodal` crate composes:
//!
//! - [`merge`]: recursive merging of partial option records onto defaults
//! - [`geometry`]: CSS-pixel rectangles and the anchoring layout function
//! - [`dom`]: an arena-backed element tree standing in for the page document
//! - [`platform`]: the dialog primitive and host capabilities overlays consume,
//!   plus a deterministic headless implementation

pub mod dom;
pub mod geometry;
pub mod merge;
pub mod platform;

pub use dom::{Document, DomError, NodeId, SharedDocument};
pub use geometry::{Point, Rect, Size};
pub use platform::{
    Backdrop, Callback, DialogController, DialogOptions, HeadlessPlatform, ListenerId,
    ObserverId, Platform, TimerId, WindowEvent,
};
