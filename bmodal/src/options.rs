//! Overlay options, actions and lifecycle listeners.
//!
//! The plain options (size, color and the behavior toggles) are resolved by
//! merging partial JSON records onto the defaults, so callers and the
//! configuration file only name what they change. Titles, content, actions
//! and listeners carry Rust values and live next to the overrides in
//! [`OverlayConfig`].

use std::fmt;
use std::rc::Rc;

use bmodal_core::merge;
use bmodal_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::overlay::Overlay;

/// Dialog width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalSize {
    #[default]
    Default,
    Small,
    Large,
    XLarge,
}

impl ModalSize {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Small => "small",
            Self::Large => "large",
            Self::XLarge => "xlarge",
        }
    }

    /// CSS class applied to the dialog box; empty for the default width.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::Small => "modal-sm",
            Self::Large => "modal-lg",
            Self::XLarge => "modal-xl",
        }
    }
}

/// Theme color shared by headers and action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Primary,
    Secondary,
    Success,
    Info,
    Warning,
    Danger,
    Light,
    #[default]
    Dark,
}

impl Color {
    pub const ALL: [Self; 8] = [
        Self::Primary,
        Self::Secondary,
        Self::Success,
        Self::Info,
        Self::Warning,
        Self::Danger,
        Self::Light,
        Self::Dark,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Header class, e.g. `text-bg-warning`.
    #[must_use]
    pub fn header_class(self) -> String {
        format!("text-bg-{}", self.as_str())
    }

    /// Button class, e.g. `btn-warning`.
    #[must_use]
    pub fn button_class(self) -> String {
        format!("btn-{}", self.as_str())
    }
}

/// Resolved presentation and behavior of one overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayOptions {
    pub size: ModalSize,
    pub color: Color,
    /// Show the dismiss glyph in the header.
    pub close_button: bool,
    /// Close when the backdrop is clicked.
    pub close_click: bool,
    /// Close when Escape is pressed.
    pub close_escape: bool,
    pub display_header: bool,
    pub display_content: bool,
    pub display_footer: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            size: ModalSize::Default,
            color: Color::Dark,
            close_button: true,
            close_click: false,
            close_escape: false,
            display_header: true,
            display_content: true,
            display_footer: true,
        }
    }
}

impl OverlayOptions {
    /// Merge `layers` left to right onto the defaults.
    ///
    /// A merged record that no longer describes valid options (a string where
    /// a flag belongs, an unknown color) is discarded in favor of the
    /// defaults.
    pub fn resolve<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let defaults = Self::default();
        let base = match serde_json::to_value(&defaults) {
            Ok(base) => base,
            Err(err) => {
                log::warn!("cannot encode default overlay options: {err}");
                return defaults;
            }
        };
        let merged = merge::merged(&base, layers);
        serde_json::from_value(merged).unwrap_or_else(|err| {
            log::warn!("ignoring invalid overlay options, using defaults: {err}");
            defaults
        })
    }
}

/// Title or body content: raw markup, or an element built by the caller.
///
/// Markup is inserted verbatim, never escaped, so untrusted text must be
/// sanitized by the caller. An element is moved into the overlay and removed
/// with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Markup(String),
    Element(NodeId),
}

impl Default for Fragment {
    fn default() -> Self {
        Self::Markup("&nbsp;".to_string())
    }
}

impl From<&str> for Fragment {
    fn from(markup: &str) -> Self {
        Self::Markup(markup.to_string())
    }
}

impl From<String> for Fragment {
    fn from(markup: String) -> Self {
        Self::Markup(markup)
    }
}

impl From<NodeId> for Fragment {
    fn from(element: NodeId) -> Self {
        Self::Element(element)
    }
}

/// Click handler of an action button; receives the owning overlay.
pub type ActionHandler = Rc<dyn Fn(&Overlay)>;

/// A footer button.
#[derive(Clone, Default)]
pub struct Action {
    pub title: String,
    pub color: Color,
    /// Icon classes, e.g. `fa-solid fa-check fa-fw`. Blank means no icon.
    pub icon: String,
    /// Runs on click. Without a handler the owner is closed.
    pub on_click: Option<ActionHandler>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("title", &self.title)
            .field("color", &self.color)
            .field("icon", &self.icon)
            .field("on_click", &self.on_click.is_some())
            .finish()
    }
}

impl Action {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn on_click(mut self, handler: impl Fn(&Overlay) + 'static) -> Self {
        self.on_click = Some(Rc::new(handler));
        self
    }

    pub(crate) fn has_icon(&self) -> bool {
        !self.icon.trim().is_empty()
    }

    pub(crate) fn run(&self, owner: &Overlay) {
        match &self.on_click {
            Some(handler) => handler(owner),
            None => owner.close(),
        }
    }
}

/// Lifecycle hooks of an overlay. Every method defaults to doing nothing.
///
/// Hooks run synchronously. `on_opening` runs before anything is mounted and
/// `on_opened` once the dialog is displayed; `on_closing` runs before the
/// dialog and its elements are released and `on_closed` after.
pub trait OverlayListener {
    fn on_opening(&self, _overlay: &Overlay) {}
    fn on_opened(&self, _overlay: &Overlay) {}
    fn on_closing(&self, _overlay: &Overlay) {}
    fn on_closed(&self, _overlay: &Overlay) {}
    fn on_show(&self, _overlay: &Overlay) {}
    fn on_hide(&self, _overlay: &Overlay) {}
}

/// Everything needed to open an overlay.
#[derive(Clone)]
pub struct OverlayConfig {
    /// Partial [`OverlayOptions`] record, merged over the host defaults.
    pub overrides: Value,
    pub title: Fragment,
    pub content: Fragment,
    pub actions: Vec<Action>,
    pub listener: Option<Rc<dyn OverlayListener>>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            overrides: Value::Object(Map::new()),
            title: Fragment::default(),
            content: Fragment::default(),
            actions: Vec::new(),
            listener: None,
        }
    }
}

impl fmt::Debug for OverlayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayConfig")
            .field("overrides", &self.overrides)
            .field("title", &self.title)
            .field("content", &self.content)
            .field("actions", &self.actions)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl OverlayConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merge a partial options record into the overrides.
    #[must_use]
    pub fn with_options(mut self, options: &Value) -> Self {
        merge::deep_extend(&mut self.overrides, [options]);
        self
    }

    fn with_option(mut self, key: &str, value: Value) -> Self {
        if !self.overrides.is_object() {
            self.overrides = Value::Object(Map::new());
        }
        if let Value::Object(overrides) = &mut self.overrides {
            overrides.insert(key.to_string(), value);
        }
        self
    }

    #[must_use]
    pub fn with_size(self, size: ModalSize) -> Self {
        self.with_option("size", size.as_str().into())
    }

    #[must_use]
    pub fn with_color(self, color: Color) -> Self {
        self.with_option("color", color.as_str().into())
    }

    #[must_use]
    pub fn close_button(self, enabled: bool) -> Self {
        self.with_option("closeButton", enabled.into())
    }

    #[must_use]
    pub fn close_on_click(self, enabled: bool) -> Self {
        self.with_option("closeClick", enabled.into())
    }

    #[must_use]
    pub fn close_on_escape(self, enabled: bool) -> Self {
        self.with_option("closeEscape", enabled.into())
    }

    #[must_use]
    pub fn display_header(self, enabled: bool) -> Self {
        self.with_option("displayHeader", enabled.into())
    }

    #[must_use]
    pub fn display_content(self, enabled: bool) -> Self {
        self.with_option("displayContent", enabled.into())
    }

    #[must_use]
    pub fn display_footer(self, enabled: bool) -> Self {
        self.with_option("displayFooter", enabled.into())
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<Fragment>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<Fragment>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions = actions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Rc<dyn OverlayListener>) -> Self {
        self.listener = Some(listener);
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = OverlayOptions::resolve([]);
        assert_eq!(options, OverlayOptions::default());
        assert_eq!(options.size, ModalSize::Default);
        assert_eq!(options.color, Color::Dark);
        assert!(options.close_button);
        assert!(!options.close_click);
        assert!(!options.close_escape);
        assert!(options.display_header && options.display_content && options.display_footer);
    }

    #[test]
    fn later_layers_win() {
        let host_defaults = json!({ "closeEscape": true, "color": "info" });
        let caller = json!({ "color": "danger", "size": "xlarge" });
        let options = OverlayOptions::resolve([&host_defaults, &caller]);

        assert!(options.close_escape);
        assert_eq!(options.color, Color::Danger);
        assert_eq!(options.size, ModalSize::XLarge);
    }

    #[test]
    fn malformed_options_fall_back_to_defaults() {
        let options = OverlayOptions::resolve([&json!({ "closeClick": "yes please" })]);
        assert_eq!(options, OverlayOptions::default());

        let options = OverlayOptions::resolve([&json!({ "color": "chartreuse" })]);
        assert_eq!(options, OverlayOptions::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let options = OverlayOptions::resolve([&json!({ "animation": "fade", "closeClick": true })]);
        assert!(options.close_click);
    }

    #[test]
    fn css_classes() {
        assert_eq!(ModalSize::Default.class(), "");
        assert_eq!(ModalSize::Small.class(), "modal-sm");
        assert_eq!(ModalSize::XLarge.class(), "modal-xl");
        assert_eq!(Color::Warning.header_class(), "text-bg-warning");
        assert_eq!(Color::Dark.button_class(), "btn-dark");
        assert_eq!(Color::ALL.len(), 8);
    }

    #[test]
    fn typed_setters_write_camel_case_overrides() {
        let config = OverlayConfig::new()
            .with_size(ModalSize::Small)
            .with_color(Color::Success)
            .close_button(false)
            .close_on_click(true)
            .close_on_escape(true)
            .display_footer(false);
        assert_eq!(
            config.overrides,
            json!({
                "size": "small",
                "color": "success",
                "closeButton": false,
                "closeClick": true,
                "closeEscape": true,
                "displayFooter": false,
            })
        );

        let options = OverlayOptions::resolve([&config.overrides]);
        assert_eq!(options.size, ModalSize::Small);
        assert!(!options.display_footer);
        assert!(options.display_header);
    }

    #[test]
    fn with_options_merges_instead_of_replacing() {
        let config = OverlayConfig::new()
            .close_on_click(true)
            .with_options(&json!({ "color": "light" }));
        assert_eq!(config.overrides, json!({ "closeClick": true, "color": "light" }));
    }

    #[test]
    fn action_defaults() {
        let action = Action::default();
        assert!(action.title.is_empty());
        assert_eq!(action.color, Color::Dark);
        assert!(!action.has_icon());
        assert!(action.on_click.is_none());

        assert!(!Action::new("x").with_icon("   ").has_icon());
        assert!(Action::new("x").with_icon("fa-solid fa-check").has_icon());
    }

    #[test]
    fn fragment_conversions() {
        assert_eq!(Fragment::default(), Fragment::Markup("&nbsp;".to_string()));
        assert_eq!(Fragment::from("<b>x</b>"), Fragment::Markup("<b>x</b>".to_string()));
    }
}
