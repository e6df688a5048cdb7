#![forbid(unsafe_code)]

//! Viewport geometry and span overlap.

use vwin_core::ArgumentError;
use vwin_core::error::check_extent;

/// Estimated extent of one item along the scroll axis: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Estimated start offset.
    pub start: f64,
    /// Estimated end offset (`start + extent`).
    pub end: f64,
}

impl Span {
    /// Create a span from a start offset and an extent.
    #[must_use]
    pub fn new(start: f64, extent: f64) -> Self {
        Self {
            start,
            end: start + extent,
        }
    }

    /// Extent of the span.
    #[must_use]
    pub fn extent(&self) -> f64 {
        self.end - self.start
    }

    /// Midpoint offset.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.start + self.extent() / 2.0
    }

    /// Whether this span intersects the half-open range `[lo, hi)`.
    ///
    /// A zero-extent span intersects when its start lies inside the range. A
    /// span straddling both edges always intersects.
    #[must_use]
    pub fn overlaps(&self, lo: f64, hi: f64) -> bool {
        if self.end > self.start {
            self.start < hi && self.end > lo
        } else {
            self.start >= lo && self.start < hi
        }
    }
}

/// Scroll position and viewport size of the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Offset of the viewport's leading edge.
    pub scroll_offset: f64,
    /// Visible extent of the viewport.
    pub visible_extent: f64,
    /// Extra extent kept in range beyond each edge.
    pub buffer_margin: f64,
}

impl ViewportState {
    /// Create a viewport state.
    #[must_use]
    pub fn new(scroll_offset: f64, visible_extent: f64, buffer_margin: f64) -> Self {
        Self {
            scroll_offset,
            visible_extent,
            buffer_margin,
        }
    }

    /// The virtual range `[offset - margin, offset + extent + margin)`.
    #[must_use]
    pub fn virtual_range(&self) -> (f64, f64) {
        (
            self.scroll_offset - self.buffer_margin,
            self.scroll_offset + self.visible_extent + self.buffer_margin,
        )
    }

    /// Midpoint of the visible (unbuffered) region.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.scroll_offset + self.visible_extent / 2.0
    }

    /// Whether `span` is inside the virtual range.
    #[must_use]
    pub fn contains(&self, span: Span) -> bool {
        let (lo, hi) = self.virtual_range();
        span.overlaps(lo, hi)
    }

    /// Validate and apply a new scroll offset. Negative offsets clamp to zero.
    pub(crate) fn set_scroll_offset(&mut self, offset: f64) -> Result<(), ArgumentError> {
        if !offset.is_finite() {
            return Err(ArgumentError::InvalidOffset(offset));
        }
        self.scroll_offset = offset.max(0.0);
        Ok(())
    }

    /// Validate and apply a new visible extent.
    pub(crate) fn set_visible_extent(&mut self, extent: f64) -> Result<(), ArgumentError> {
        self.visible_extent = check_extent(extent)?;
        Ok(())
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_overlap() {
        let range = (0.0, 250.0);
        assert!(Span::new(0.0, 100.0).overlaps(range.0, range.1));
        assert!(Span::new(200.0, 100.0).overlaps(range.0, range.1));
        assert!(!Span::new(300.0, 100.0).overlaps(range.0, range.1));
        // Touching the trailing edge is outside.
        assert!(!Span::new(250.0, 10.0).overlaps(range.0, range.1));
        // Ending exactly at the leading edge is outside.
        assert!(!Span::new(-10.0, 10.0).overlaps(range.0, range.1));
    }

    #[test]
    fn straddling_span_is_in_range() {
        assert!(Span::new(-50.0, 400.0).overlaps(0.0, 250.0));
    }

    #[test]
    fn zero_extent_spans() {
        assert!(Span::new(0.0, 0.0).overlaps(0.0, 250.0));
        assert!(Span::new(100.0, 0.0).overlaps(0.0, 250.0));
        assert!(!Span::new(250.0, 0.0).overlaps(0.0, 250.0));
        // An empty range contains nothing.
        assert!(!Span::new(10.0, 0.0).overlaps(10.0, 10.0));
    }

    #[test]
    fn virtual_range_includes_margin() {
        let vp = ViewportState::new(150.0, 250.0, 50.0);
        assert_eq!(vp.virtual_range(), (100.0, 450.0));
        assert_eq!(vp.midpoint(), 275.0);
        assert!(vp.contains(Span::new(60.0, 50.0)));
        assert!(!vp.contains(Span::new(0.0, 100.0)));
    }

    #[test]
    fn offset_validation() {
        let mut vp = ViewportState::default();
        assert!(vp.set_scroll_offset(f64::NAN).is_err());
        vp.set_scroll_offset(-20.0).unwrap();
        assert_eq!(vp.scroll_offset, 0.0);
        assert!(vp.set_visible_extent(-1.0).is_err());
        vp.set_visible_extent(300.0).unwrap();
        assert_eq!(vp.visible_extent, 300.0);
    }
}
