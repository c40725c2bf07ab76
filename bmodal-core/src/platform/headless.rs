//! Deterministic in-process platform.
//!
//! Time only moves through [`HeadlessPlatform::advance`], randomness comes from
//! a seedable generator, and user input (clicks, Escape, scrolling, resizing)
//! is injected explicitly. Every registration is counted so callers can check
//! that nothing outlives its owner.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::SlotMap;

use super::{
    Backdrop, Callback, DialogController, DialogOptions, ListenerId, ObserverId, Platform,
    TimerId, WindowEvent,
};
use crate::dom::{Document, DomError, NodeId, SharedDocument};
use crate::geometry::{Point, Rect, Size};

struct Timer {
    period: Duration,
    due: Duration,
    callback: Callback,
}

struct Observer {
    target: NodeId,
    callback: Callback,
}

struct WindowListener {
    event: WindowEvent,
    callback: Callback,
}

struct HeadlessState {
    now: Duration,
    timers: SlotMap<TimerId, Timer>,
    observers: SlotMap<ObserverId, Observer>,
    listeners: SlotMap<ListenerId, WindowListener>,
    /// Shown dialogs, most recently shown last.
    shown: Vec<Weak<RefCell<DialogState>>>,
    rng: StdRng,
    backdrop_replacement: bool,
    open_dialogs: usize,
}

pub struct HeadlessPlatform {
    document: SharedDocument,
    state: Rc<RefCell<HeadlessState>>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HeadlessPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessPlatform")
            .field("now", &self.now())
            .field("active_timers", &self.active_timers())
            .field("active_observers", &self.active_observers())
            .field("active_listeners", &self.active_listeners())
            .field("open_dialogs", &self.open_dialogs())
            .finish_non_exhaustive()
    }
}

impl HeadlessPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// A platform whose random choices are reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            document: Document::new().into_shared(),
            state: Rc::new(RefCell::new(HeadlessState {
                now: Duration::ZERO,
                timers: SlotMap::with_key(),
                observers: SlotMap::with_key(),
                listeners: SlotMap::with_key(),
                shown: Vec::new(),
                rng: StdRng::seed_from_u64(seed),
                backdrop_replacement: true,
                open_dialogs: 0,
            })),
        }
    }

    /// Make every dialog refuse [`DialogController::replace_backdrop`], like a
    /// dialog library without that hook.
    #[must_use]
    pub fn without_backdrop_replacement(self) -> Self {
        self.state.borrow_mut().backdrop_replacement = false;
        self
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Move the clock forward, firing due timers in order. A timer that is
    /// due several times within `by` fires once per period.
    pub fn advance(&self, by: Duration) {
        let target = self.state.borrow().now + by;
        loop {
            let callback = {
                let mut state = self.state.borrow_mut();
                let next = state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| timer.due)
                    .map(|(id, _)| id);
                let Some(id) = next else {
                    break;
                };
                let Some(timer) = state.timers.get_mut(id) else {
                    break;
                };
                let due = timer.due;
                timer.due += timer.period;
                let callback = timer.callback.clone();
                state.now = due;
                callback
            };
            callback();
        }
        self.state.borrow_mut().now = target;
    }

    /// Report that `target` changed size.
    pub fn notify_resize(&self, target: NodeId) {
        let callbacks: Vec<Callback> = self
            .state
            .borrow()
            .observers
            .values()
            .filter(|observer| observer.target == target)
            .map(|observer| observer.callback.clone())
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Lay `target` out at `rect` and notify its observers.
    pub fn resize_element(&self, target: NodeId, rect: Rect) -> Result<(), DomError> {
        self.document.borrow_mut().set_bounding_rect(target, rect)?;
        self.notify_resize(target);
        Ok(())
    }

    /// Scroll the page and fire scroll listeners.
    pub fn scroll_to(&self, x: f64, y: f64) {
        self.document.borrow_mut().set_scroll_offset(Point::new(x, y));
        self.fire_window_event(WindowEvent::Scroll);
    }

    /// Resize the viewport and fire resize listeners.
    pub fn resize_viewport(&self, width: f64, height: f64) {
        self.document
            .borrow_mut()
            .set_viewport(Size::new(width, height));
        self.fire_window_event(WindowEvent::Resize);
    }

    fn fire_window_event(&self, event: WindowEvent) {
        let callbacks: Vec<Callback> = self
            .state
            .borrow()
            .listeners
            .values()
            .filter(|listener| listener.event == event)
            .map(|listener| listener.callback.clone())
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Press Escape. The topmost shown dialog that accepts the keyboard
    /// receives a dismissal request. Returns whether one did.
    pub fn press_escape(&self) -> bool {
        let on_dismiss = {
            let mut state = self.state.borrow_mut();
            state.shown.retain(|dialog| dialog.strong_count() > 0);
            state
                .shown
                .last()
                .and_then(Weak::upgrade)
                .and_then(|dialog| {
                    let dialog = dialog.borrow();
                    if dialog.options.keyboard {
                        dialog.options.on_dismiss.clone()
                    } else {
                        None
                    }
                })
        };
        match on_dismiss {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Click `node`. Returns whether any listener ran.
    pub fn click(&self, node: NodeId) -> bool {
        Document::click(&self.document, node)
    }

    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    #[must_use]
    pub fn active_observers(&self) -> usize {
        self.state.borrow().observers.len()
    }

    #[must_use]
    pub fn active_listeners(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Dialogs created and not yet disposed.
    #[must_use]
    pub fn open_dialogs(&self) -> usize {
        self.state.borrow().open_dialogs
    }
}

impl Platform for HeadlessPlatform {
    fn document(&self) -> SharedDocument {
        self.document.clone()
    }

    fn create_dialog(&self, panel: NodeId, options: DialogOptions) -> Box<dyn DialogController> {
        self.state.borrow_mut().open_dialogs += 1;
        Box::new(HeadlessDialog {
            document: self.document.clone(),
            platform: Rc::downgrade(&self.state),
            state: Rc::new(RefCell::new(DialogState {
                panel,
                options,
                backdrop: None,
                substituted: false,
                shown: false,
            })),
            disposed: false,
        })
    }

    fn observe_resize(&self, target: NodeId, callback: Callback) -> ObserverId {
        self.state
            .borrow_mut()
            .observers
            .insert(Observer { target, callback })
    }

    fn disconnect(&self, observer: ObserverId) -> bool {
        self.state.borrow_mut().observers.remove(observer).is_some()
    }

    fn add_window_listener(&self, event: WindowEvent, callback: Callback) -> ListenerId {
        self.state
            .borrow_mut()
            .listeners
            .insert(WindowListener { event, callback })
    }

    fn remove_window_listener(&self, listener: ListenerId) -> bool {
        self.state.borrow_mut().listeners.remove(listener).is_some()
    }

    fn set_interval(&self, period: Duration, callback: Callback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let period = period.max(Duration::from_millis(1));
        let due = state.now + period;
        state.timers.insert(Timer {
            period,
            due,
            callback,
        })
    }

    fn clear_interval(&self, timer: TimerId) -> bool {
        self.state.borrow_mut().timers.remove(timer).is_some()
    }

    fn random_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.state.borrow_mut().rng.random_range(0..len)
    }
}

struct DialogState {
    panel: NodeId,
    options: DialogOptions,
    backdrop: Option<NodeId>,
    /// `backdrop` was supplied through `replace_backdrop` and is kept while
    /// hidden.
    substituted: bool,
    shown: bool,
}

/// Dialog that mimics a browser modal: the panel is toggled with `display`
/// and the `show` class, and a `.modal-backdrop` is appended to the body while
/// shown.
struct HeadlessDialog {
    document: SharedDocument,
    platform: Weak<RefCell<HeadlessState>>,
    state: Rc<RefCell<DialogState>>,
    disposed: bool,
}

impl HeadlessDialog {
    fn dismiss_listener(&self) -> Option<Callback> {
        let state = self.state.borrow();
        match state.options.backdrop {
            Backdrop::Dismissable => state.options.on_dismiss.clone(),
            Backdrop::Static => None,
        }
    }
}

impl DialogController for HeadlessDialog {
    fn show(&mut self) -> Result<(), DomError> {
        if self.state.borrow().shown {
            return Ok(());
        }
        let (panel, kept) = {
            let state = self.state.borrow();
            (state.panel, state.backdrop.filter(|_| state.substituted))
        };
        let dismiss = self.dismiss_listener();
        let mut doc = self.document.borrow_mut();

        doc.set_style(panel, "display", "block")?;
        doc.add_class(panel, "show")?;
        doc.set_attribute(panel, "aria-modal", "true")?;
        doc.set_attribute(panel, "role", "dialog")?;

        let kept = kept.filter(|&backdrop| doc.tag(backdrop).is_some());
        let backdrop = match kept {
            Some(backdrop) => backdrop,
            None => {
                let backdrop = doc.create_element("div");
                doc.add_classes(backdrop, "modal-backdrop fade show")?;
                if let Some(dismiss) = dismiss {
                    doc.add_click_listener(backdrop, dismiss)?;
                }
                backdrop
            }
        };
        let body = doc.body();
        doc.append_child(body, backdrop)?;
        drop(doc);

        {
            let mut state = self.state.borrow_mut();
            state.backdrop = Some(backdrop);
            state.substituted = kept.is_some();
            state.shown = true;
        }
        if let Some(platform) = self.platform.upgrade() {
            platform.borrow_mut().shown.push(Rc::downgrade(&self.state));
        }
        Ok(())
    }

    fn hide(&mut self) -> Result<(), DomError> {
        let (panel, backdrop, substituted) = {
            let mut state = self.state.borrow_mut();
            if !state.shown {
                return Ok(());
            }
            state.shown = false;
            let backdrop = if state.substituted {
                state.backdrop
            } else {
                state.backdrop.take()
            };
            (state.panel, backdrop, state.substituted)
        };
        if let Some(platform) = self.platform.upgrade() {
            let this = Rc::downgrade(&self.state);
            platform
                .borrow_mut()
                .shown
                .retain(|dialog| !dialog.ptr_eq(&this));
        }

        let mut doc = self.document.borrow_mut();
        match backdrop {
            Some(backdrop) if substituted => {
                doc.detach(backdrop);
            }
            Some(backdrop) => {
                doc.remove(backdrop);
            }
            None => {}
        }
        if doc.contains(panel) {
            doc.set_style(panel, "display", "none")?;
            doc.remove_class(panel, "show")?;
            doc.set_attribute(panel, "aria-hidden", "true")?;
        }
        Ok(())
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        // Nothing to report: a panel that vanished is already hidden.
        let _ = self.hide();
        self.disposed = true;
        let kept = {
            let mut state = self.state.borrow_mut();
            state.substituted = false;
            state.backdrop.take()
        };
        if let Some(backdrop) = kept {
            self.document.borrow_mut().remove(backdrop);
        }
        if let Some(platform) = self.platform.upgrade() {
            let mut platform = platform.borrow_mut();
            platform.open_dialogs = platform.open_dialogs.saturating_sub(1);
        }
    }

    fn is_shown(&self) -> bool {
        self.state.borrow().shown
    }

    fn backdrop(&self) -> Option<NodeId> {
        self.state.borrow().backdrop
    }

    fn replace_backdrop(&mut self, backdrop: NodeId) -> bool {
        let supported = self
            .platform
            .upgrade()
            .is_some_and(|platform| platform.borrow().backdrop_replacement);
        if !supported {
            return false;
        }

        let dismiss = self.dismiss_listener();
        let mut doc = self.document.borrow_mut();
        if doc.tag(backdrop).is_none() {
            return false;
        }
        // A backdrop created outside the dialog still honors dismissal.
        if let Some(dismiss) = dismiss {
            if doc.add_click_listener(backdrop, dismiss).is_err() {
                return false;
            }
        }

        let previous = {
            let mut state = self.state.borrow_mut();
            state.substituted = true;
            state.backdrop.replace(backdrop)
        };
        if let Some(previous) = previous.filter(|&previous| previous != backdrop) {
            doc.remove(previous);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn mounted_panel(platform: &HeadlessPlatform) -> NodeId {
        let doc = platform.document();
        let mut doc = doc.borrow_mut();
        let panel = doc.create_element("div");
        doc.add_class(panel, "modal").expect("element");
        let body = doc.body();
        doc.append_child(body, panel).expect("mount");
        panel
    }

    fn counter() -> (Rc<Cell<usize>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let callback: Callback = {
            let count = count.clone();
            Rc::new(move || count.set(count.get() + 1))
        };
        (count, callback)
    }

    #[test]
    fn interval_fires_once_per_period() {
        let platform = HeadlessPlatform::with_seed(1);
        let (count, callback) = counter();
        platform.set_interval(Duration::from_millis(5000), callback);

        platform.advance(Duration::from_millis(4999));
        assert_eq!(count.get(), 0);
        platform.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        platform.advance(Duration::from_millis(15_000));
        assert_eq!(count.get(), 4);
        assert_eq!(platform.now(), Duration::from_millis(20_000));
    }

    #[test]
    fn cleared_interval_stops_firing() {
        let platform = HeadlessPlatform::with_seed(1);
        let (count, callback) = counter();
        let timer = platform.set_interval(Duration::from_millis(10), callback);

        platform.advance(Duration::from_millis(10));
        assert!(platform.clear_interval(timer));
        assert!(!platform.clear_interval(timer));
        platform.advance(Duration::from_millis(100));
        assert_eq!(count.get(), 1);
        assert_eq!(platform.active_timers(), 0);
    }

    #[test]
    fn timer_may_clear_itself() {
        let platform = Rc::new(HeadlessPlatform::with_seed(1));
        let fired = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
        let callback: Callback = {
            let platform = Rc::downgrade(&platform);
            let fired = fired.clone();
            let slot = slot.clone();
            Rc::new(move || {
                fired.set(fired.get() + 1);
                if let (Some(platform), Some(id)) = (platform.upgrade(), slot.get()) {
                    platform.clear_interval(id);
                }
            })
        };
        slot.set(Some(platform.set_interval(Duration::from_millis(1), callback)));

        platform.advance(Duration::from_millis(50));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn seeded_platforms_agree() {
        let a = HeadlessPlatform::with_seed(7);
        let b = HeadlessPlatform::with_seed(7);
        let picks_a: Vec<_> = (0..16).map(|_| a.random_index(71)).collect();
        let picks_b: Vec<_> = (0..16).map(|_| b.random_index(71)).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|&i| i < 71));
        assert_eq!(a.random_index(0), 0);
    }

    #[test]
    fn show_appends_backdrop_and_hide_removes_it() {
        let platform = HeadlessPlatform::with_seed(1);
        let panel = mounted_panel(&platform);
        let mut dialog = platform.create_dialog(panel, DialogOptions::default());

        dialog.show().expect("show");
        let backdrop = dialog.backdrop().expect("backdrop while shown");
        {
            let doc = platform.document();
            let doc = doc.borrow();
            assert!(doc.is_connected(backdrop));
            assert!(doc.has_class(backdrop, "modal-backdrop"));
            assert!(doc.has_class(panel, "show"));
            assert_eq!(doc.style(panel, "display"), Some("block"));
        }

        dialog.hide().expect("hide");
        assert!(!dialog.is_shown());
        assert_eq!(dialog.backdrop(), None);
        let doc = platform.document();
        assert!(!doc.borrow().contains(backdrop));
        assert_eq!(doc.borrow().style(panel, "display"), Some("none"));
    }

    #[test]
    fn backdrop_click_requests_dismissal_unless_static() {
        let platform = HeadlessPlatform::with_seed(1);
        let (count, on_dismiss) = counter();

        let panel = mounted_panel(&platform);
        let mut dismissable = platform.create_dialog(
            panel,
            DialogOptions {
                on_dismiss: Some(on_dismiss.clone()),
                ..DialogOptions::default()
            },
        );
        dismissable.show().expect("show");
        let backdrop = dismissable.backdrop().expect("backdrop");
        assert!(platform.click(backdrop));
        assert_eq!(count.get(), 1);
        assert!(dismissable.is_shown(), "dismissal is only a request");

        let panel = mounted_panel(&platform);
        let mut fixed = platform.create_dialog(
            panel,
            DialogOptions {
                backdrop: Backdrop::Static,
                on_dismiss: Some(on_dismiss),
                ..DialogOptions::default()
            },
        );
        fixed.show().expect("show");
        let backdrop = fixed.backdrop().expect("backdrop");
        assert!(!platform.click(backdrop));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn escape_targets_topmost_keyboard_dialog() {
        let platform = HeadlessPlatform::with_seed(1);
        let (lower_count, lower) = counter();
        let (upper_count, upper) = counter();

        let panel = mounted_panel(&platform);
        let mut first = platform.create_dialog(
            panel,
            DialogOptions {
                keyboard: true,
                on_dismiss: Some(lower),
                ..DialogOptions::default()
            },
        );
        first.show().expect("show");
        let panel = mounted_panel(&platform);
        let mut second = platform.create_dialog(
            panel,
            DialogOptions {
                keyboard: false,
                on_dismiss: Some(upper),
                ..DialogOptions::default()
            },
        );
        second.show().expect("show");

        assert!(!platform.press_escape(), "topmost dialog ignores the keyboard");
        second.hide().expect("hide");
        assert!(platform.press_escape());
        assert_eq!((lower_count.get(), upper_count.get()), (1, 0));
    }

    #[test]
    fn replace_backdrop_swaps_the_element() {
        let platform = HeadlessPlatform::with_seed(1);
        let panel = mounted_panel(&platform);
        let mut dialog = platform.create_dialog(panel, DialogOptions::default());
        dialog.show().expect("show");
        let original = dialog.backdrop().expect("backdrop");

        let doc = platform.document();
        let custom = doc.borrow_mut().create_element("div");
        assert!(dialog.replace_backdrop(custom));
        assert_eq!(dialog.backdrop(), Some(custom));
        assert!(!doc.borrow().contains(original));

        dialog.dispose();
        assert!(!doc.borrow().contains(custom), "disposing frees the substitute");
    }

    #[test]
    fn substituted_backdrop_survives_hide_and_show() {
        let platform = HeadlessPlatform::with_seed(1);
        let panel = mounted_panel(&platform);
        let mut dialog = platform.create_dialog(panel, DialogOptions::default());
        dialog.show().expect("show");

        let doc = platform.document();
        let custom = doc.borrow_mut().create_element("div");
        doc.borrow_mut()
            .set_style(custom, "width", "400px")
            .expect("style");
        assert!(dialog.replace_backdrop(custom));
        let body = doc.borrow().body();
        doc.borrow_mut().append_child(body, custom).expect("mount");

        dialog.hide().expect("hide");
        assert!(doc.borrow().contains(custom));
        assert!(!doc.borrow().is_connected(custom));
        assert_eq!(dialog.backdrop(), Some(custom));

        dialog.show().expect("show");
        assert_eq!(dialog.backdrop(), Some(custom));
        assert!(doc.borrow().is_connected(custom));
        assert_eq!(doc.borrow().style(custom, "width"), Some("400px"));
        assert_eq!(
            doc.borrow().find_all_by_class(body, "modal-backdrop").len(),
            0,
            "no fresh backdrop next to the substitute"
        );
    }

    #[test]
    fn stale_substitute_is_refused() {
        let platform = HeadlessPlatform::with_seed(1);
        let panel = mounted_panel(&platform);
        let (_count, on_dismiss) = counter();
        let mut dialog = platform.create_dialog(
            panel,
            DialogOptions {
                on_dismiss: Some(on_dismiss),
                ..DialogOptions::default()
            },
        );
        dialog.show().expect("show");
        let original = dialog.backdrop();

        let doc = platform.document();
        let gone = doc.borrow_mut().create_element("div");
        doc.borrow_mut().remove(gone);
        assert!(!dialog.replace_backdrop(gone));

        let markup = doc.borrow_mut().create_markup("<div></div>");
        assert!(!dialog.replace_backdrop(markup));

        assert_eq!(dialog.backdrop(), original);
        assert!(doc.borrow().contains(original.expect("backdrop")));
    }

    #[test]
    fn replace_backdrop_can_be_unsupported() {
        let platform = HeadlessPlatform::with_seed(1).without_backdrop_replacement();
        let panel = mounted_panel(&platform);
        let mut dialog = platform.create_dialog(panel, DialogOptions::default());
        dialog.show().expect("show");
        let original = dialog.backdrop();

        let custom = platform.document().borrow_mut().create_element("div");
        assert!(!dialog.replace_backdrop(custom));
        assert_eq!(dialog.backdrop(), original);
    }

    #[test]
    fn dispose_is_counted_once() {
        let platform = HeadlessPlatform::with_seed(1);
        let panel = mounted_panel(&platform);
        let mut dialog = platform.create_dialog(panel, DialogOptions::default());
        dialog.show().expect("show");
        assert_eq!(platform.open_dialogs(), 1);

        dialog.dispose();
        dialog.dispose();
        assert_eq!(platform.open_dialogs(), 0);
        assert!(!dialog.is_shown());
    }

    #[test]
    fn window_events_reach_matching_listeners() {
        let platform = HeadlessPlatform::with_seed(1);
        let (scrolls, on_scroll) = counter();
        let (resizes, on_resize) = counter();
        platform.add_window_listener(WindowEvent::Scroll, on_scroll);
        let resize = platform.add_window_listener(WindowEvent::Resize, on_resize);

        platform.scroll_to(0.0, 120.0);
        platform.resize_viewport(800.0, 600.0);
        assert_eq!((scrolls.get(), resizes.get()), (1, 1));
        assert_eq!(platform.document().borrow().scroll_offset(), Point::new(0.0, 120.0));

        assert!(platform.remove_window_listener(resize));
        platform.resize_viewport(640.0, 480.0);
        assert_eq!(resizes.get(), 1);
        assert_eq!(platform.active_listeners(), 1);
    }

    #[test]
    fn resize_observers_follow_their_target() {
        let platform = HeadlessPlatform::with_seed(1);
        let panel = mounted_panel(&platform);
        let other = mounted_panel(&platform);
        let (count, callback) = counter();
        let observer = platform.observe_resize(panel, callback);

        platform
            .resize_element(panel, Rect::new(0.0, 0.0, 10.0, 10.0))
            .expect("element");
        platform.notify_resize(other);
        assert_eq!(count.get(), 1);

        assert!(platform.disconnect(observer));
        platform.notify_resize(panel);
        assert_eq!(count.get(), 1);
        assert_eq!(platform.active_observers(), 0);
    }
}
