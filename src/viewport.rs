/// Host side of scroll navigation (mockable for testing)
pub trait Viewport {
    /// Document-relative top offset of the element with `id`, if it exists
    fn element_offset_top(&self, id: &str) -> Option<f64>;
    /// Smooth-scroll so the document offset `top` sits at the viewport top
    fn smooth_scroll_to(&mut self, top: f64);
    /// Push one history entry whose location fragment is `#fragment`
    fn push_fragment(&mut self, fragment: &str);
}

/// One observation delivered by the host's intersection primitive
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub target_id: String,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn entering(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            is_intersecting: true,
        }
    }

    pub fn leaving(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            is_intersecting: false,
        }
    }
}

/// Position of a heading relative to the viewport top, for hosts that
/// report layout instead of intersections
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingRect {
    pub id: String,
    pub top: f64,
    pub bottom: f64,
}

impl HeadingRect {
    pub fn new(id: impl Into<String>, top: f64, bottom: f64) -> Self {
        Self {
            id: id.into(),
            top,
            bottom,
        }
    }
}

/// What happened to a click on a TOC link
#[derive(Debug, Clone, PartialEq)]
pub enum LinkClick {
    /// Default navigation was prevented and the viewport scrolled itself
    Scrolled { target: String, top: f64 },
    /// Not an in-page link to an existing element; let the host navigate
    Default,
}

/// Viewport that records every request, with a fixed element layout
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct RecordingViewport {
    pub offsets: std::collections::HashMap<String, f64>,
    pub scrolls: Vec<f64>,
    pub history: Vec<String>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingViewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, id: &str, offset_top: f64) -> Self {
        self.offsets.insert(id.to_string(), offset_top);
        self
    }

    /// The location fragment after the last history push
    pub fn current_fragment(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Viewport for RecordingViewport {
    fn element_offset_top(&self, id: &str) -> Option<f64> {
        self.offsets.get(id).copied()
    }

    fn smooth_scroll_to(&mut self, top: f64) {
        self.scrolls.push(top);
    }

    fn push_fragment(&mut self, fragment: &str) {
        self.history.push(format!("#{fragment}"));
    }
}
