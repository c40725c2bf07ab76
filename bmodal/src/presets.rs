//! Ready-made overlays: a yes/no confirmation and one colored notice per theme
//! color.

use std::rc::Rc;

use crate::options::{Action, Color, Fragment, OverlayConfig};
use crate::overlay::{Overlay, OverlayError, OverlayHost};

pub const CHECK_ICON: &str = "fa-solid fa-check fa-fw";
pub const XMARK_ICON: &str = "fa-solid fa-xmark fa-fw";

/// Conventional notice title.
pub const NOTICE_TITLE: &str = "Important";

/// Overrides accepted by [`Overlay::confirm`].
#[derive(Debug, Clone)]
pub struct ConfirmOptions {
    pub title: Fragment,
    pub color: Color,
    pub actions: Vec<Action>,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            title: Fragment::from("Confirm"),
            color: Color::Warning,
            actions: vec![
                Action::new("No")
                    .with_color(Color::Danger)
                    .with_icon(XMARK_ICON),
                Action::new("Yes")
                    .with_color(Color::Success)
                    .with_icon(CHECK_ICON),
            ],
        }
    }
}

impl ConfirmOptions {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<Fragment>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }
}

impl Overlay {
    /// Ask a question. By default offers "No" and "Yes", both of which only
    /// close the overlay; pass actions with handlers to react to the answer.
    pub fn confirm(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        options: ConfirmOptions,
    ) -> Result<Self, OverlayError> {
        Self::open(
            host,
            OverlayConfig::new()
                .with_title(options.title)
                .with_content(content)
                .with_color(options.color)
                .with_actions(options.actions),
        )
    }

    /// A notice in `color` with a single "Close" button of the same color.
    pub fn notice(
        host: &Rc<OverlayHost>,
        color: Color,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::open(
            host,
            OverlayConfig::new()
                .with_title(title)
                .with_content(content)
                .with_color(color)
                .with_action(Action::new("Close").with_color(color).with_icon(XMARK_ICON)),
        )
    }

    pub fn primary(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Primary, content, title)
    }

    pub fn secondary(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Secondary, content, title)
    }

    pub fn success(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Success, content, title)
    }

    pub fn info(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Info, content, title)
    }

    pub fn warning(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Warning, content, title)
    }

    pub fn danger(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Danger, content, title)
    }

    pub fn light(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Light, content, title)
    }

    pub fn dark(
        host: &Rc<OverlayHost>,
        content: impl Into<Fragment>,
        title: impl Into<Fragment>,
    ) -> Result<Self, OverlayError> {
        Self::notice(host, Color::Dark, content, title)
    }
}
