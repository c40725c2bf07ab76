//! CSS-pixel geometry.

/// A point, or an offset, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A box positioned by its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Shift the box by `by` (x moves `left`, y moves `top`).
    #[must_use]
    pub fn offset(&self, by: Point) -> Self {
        Self::new(self.top + by.y, self.left + by.x, self.width, self.height)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Placement of an anchored overlay over a target region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorLayout {
    /// Document-space box covering the target; applied to the dialog panel
    /// and to its backdrop.
    pub frame: Rect,
    /// Position of the content box inside `frame`, centering it.
    pub content_offset: Point,
}

/// Compute where an anchored overlay goes.
///
/// `target` is the target's viewport-relative bounding box, `scroll` the page
/// scroll offset and `content` the measured size of the box to center. The
/// result depends on nothing else, so repeated calls are idempotent.
#[must_use]
pub fn anchor_layout(target: Rect, scroll: Point, content: Size) -> AnchorLayout {
    AnchorLayout {
        frame: target.offset(scroll),
        content_offset: Point::new(
            (target.width - content.width) / 2.0,
            (target.height - content.height) / 2.0,
        ),
    }
}

/// Format a CSS pixel length.
#[must_use]
pub fn px(value: f64) -> String {
    format!("{value}px")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_matches_target_without_scroll() {
        let target = Rect::new(100.0, 50.0, 400.0, 300.0);
        let layout = anchor_layout(target, Point::default(), Size::new(200.0, 100.0));
        assert_eq!(layout.frame, target);
        assert_eq!(layout.content_offset, Point::new(100.0, 100.0));
    }

    #[test]
    fn frame_is_offset_by_page_scroll() {
        let target = Rect::new(10.0, 20.0, 300.0, 200.0);
        let layout = anchor_layout(target, Point::new(5.0, 250.0), Size::new(100.0, 50.0));
        assert_eq!(layout.frame, Rect::new(260.0, 25.0, 300.0, 200.0));
        // Centering is relative to the frame, scroll does not move it.
        assert_eq!(layout.content_offset, Point::new(100.0, 75.0));
    }

    #[test]
    fn oversized_content_gets_negative_offset() {
        let layout = anchor_layout(
            Rect::new(0.0, 0.0, 300.0, 100.0),
            Point::default(),
            Size::new(500.0, 140.0),
        );
        assert_eq!(layout.content_offset, Point::new(-100.0, -20.0));
    }

    #[test]
    fn zero_target_yields_zero_frame() {
        let layout = anchor_layout(Rect::ZERO, Point::default(), Size::default());
        assert_eq!(layout.frame, Rect::ZERO);
        assert!(layout.frame.is_empty());
    }

    #[test]
    fn px_formats_whole_and_fractional_values() {
        assert_eq!(px(100.0), "100px");
        assert_eq!(px(12.5), "12.5px");
        assert_eq!(px(-4.0), "-4px");
    }
}
