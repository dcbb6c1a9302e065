//! One-shot "scrolled into view" detection.
//!
//! [`RevealLatch`] consumes intersection observations for a single element and
//! flips to visible the first time the element shows at least `threshold` of its
//! area inside the (margin-adjusted) viewport. Once visible it stops observing.

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f64 {
        self.x + self.width
    }

    fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Grows (positive) or shrinks (negative) the viewport before intersecting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin {
                bottom: -50.0,
                ..RootMargin::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    /// Visible fraction of the element, in `0.0..=1.0`.
    pub ratio: f64,
}

/// Intersection of `element` with `viewport` after applying `margin`.
pub fn intersect(element: Rect, viewport: Rect, margin: RootMargin) -> IntersectionEntry {
    let root = Rect {
        x: viewport.x - margin.left,
        y: viewport.y - margin.top,
        width: viewport.width + margin.left + margin.right,
        height: viewport.height + margin.top + margin.bottom,
    };

    let w = element.right().min(root.right()) - element.x.max(root.x);
    let h = element.bottom().min(root.bottom()) - element.y.max(root.y);
    let is_intersecting = w >= 0.0 && h >= 0.0;

    let area = element.width * element.height;
    let ratio = match (is_intersecting, area > 0.0) {
        (false, _) => 0.0,
        (true, true) => ((w * h) / area).clamp(0.0, 1.0),
        (true, false) => 1.0,
    };

    IntersectionEntry {
        is_intersecting,
        ratio,
    }
}

#[derive(Debug, Clone)]
pub struct RevealLatch {
    options: RevealOptions,
    visible: bool,
}

impl Default for RevealLatch {
    fn default() -> Self {
        Self::new(RevealOptions::default())
    }
}

impl RevealLatch {
    pub fn new(options: RevealOptions) -> Self {
        Self {
            options,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// False once the latch has fired.
    pub fn is_observing(&self) -> bool {
        !self.visible
    }

    /// Feeds one observation. Returns true only on the call that flips the latch.
    pub fn observe(&mut self, entry: IntersectionEntry) -> bool {
        if self.visible {
            return false;
        }
        if entry.is_intersecting && entry.ratio >= self.options.threshold {
            self.visible = true;
            return true;
        }
        false
    }

    pub fn observe_rects(&mut self, element: Rect, viewport: Rect) -> bool {
        let entry = intersect(element, viewport, self.options.root_margin);
        self.observe(entry)
    }
}
