#![forbid(unsafe_code)]

//! The windowing pass: admit items entering the virtual range, evict items
//! leaving it.
//!
//! # Algorithm
//!
//! The backing list is scanned top to bottom with a running offset from the
//! [`PositionEstimator`]. For every item the pass compares two facts:
//!
//! | in window | in range | action |
//! |-----------|----------|--------|
//! | yes       | yes      | keep   |
//! | no        | no       | none   |
//! | yes       | no       | evict  |
//! | no        | yes      | admit  |
//!
//! Because the window is a subsequence of the backing list, the scan meets
//! window entries in window order. A scan cursor tracks how many window
//! entries have been passed; every entry before it is earlier in backing
//! order, so every admission lands at the cursor. For a run above the
//! viewport midpoint that slot is the window start, below it the slot after
//! the last kept item, and within a run it is right after the previously
//! admitted item. The midpoint side of a run therefore never changes where
//! an item goes; it only splits runs for [`PassStats::runs`]. A run ends when
//! the scan keeps, evicts, or skips an item, or when admissions cross the
//! viewport midpoint.
//!
//! When the backing list repeats an identity, only its first occurrence is
//! windowed; later occurrences are skipped.
//!
//! The pass is O(n) in the backing list plus O(w) per window mutation, and
//! re-running it on unchanged inputs performs no mutation.

use std::hash::Hash;

use rustc_hash::FxHashSet;
use vwin_core::Result;

use crate::estimator::PositionEstimator;
use crate::height_cache::HeightCache;
use crate::rendered::RenderedWindow;
use crate::viewport::ViewportState;

/// Counters describing one windowing pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PassStats {
    /// Backing items scanned.
    pub scanned: usize,
    /// Items admitted into the window.
    pub admitted: usize,
    /// Items evicted because they left the virtual range.
    pub evicted: usize,
    /// Window entries dropped because the scan could not find them in
    /// backing order (stale identities or out-of-order entries).
    pub stale: usize,
    /// Number of admission runs.
    pub runs: usize,
    /// Whether every scanned item had a measured extent.
    pub all_extents_known: bool,
    /// Estimated end offset of the last item.
    pub content_extent: f64,
}

impl PassStats {
    /// Whether the pass left the window untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.admitted == 0 && self.evicted == 0 && self.stale == 0
    }
}

/// Scans `items` and brings `window` in line with `viewport`.
#[derive(Debug)]
pub struct Windower<'a, T> {
    heights: &'a HeightCache<T>,
    spacing: f64,
    viewport: ViewportState,
}

impl<'a, T: Clone + Eq + Hash> Windower<'a, T> {
    /// Create a windower for one pass.
    #[must_use]
    pub fn new(heights: &'a HeightCache<T>, spacing: f64, viewport: ViewportState) -> Self {
        Self {
            heights,
            spacing,
            viewport,
        }
    }

    /// Run the pass, mutating `window` in place.
    pub fn run(&self, items: &[T], window: &mut RenderedWindow<T>) -> Result<PassStats> {
        let _span = vwin_core::debug_span!(
            "window_pass",
            items = items.len(),
            window = window.len(),
            offset = self.viewport.scroll_offset,
            visible = self.viewport.visible_extent
        )
        .entered();

        let (lo, hi) = self.viewport.virtual_range();
        let midpoint = self.viewport.midpoint();
        let estimator = PositionEstimator::new(self.heights, self.spacing);
        let mut spans = estimator.spans(items);

        let mut stats = PassStats::default();
        let mut cursor = 0usize;
        // Midpoint side of the admission run in progress.
        let mut run_up: Option<bool> = None;
        let mut seen: FxHashSet<&T> = FxHashSet::default();

        for (_, item, span) in spans.by_ref() {
            stats.scanned += 1;
            if !seen.insert(item) {
                // Repeated identity: the first occurrence decides.
                run_up = None;
                continue;
            }
            let in_range = span.overlaps(lo, hi);

            if window.contains(item) {
                run_up = None;
                if window.get(cursor) != Some(item) {
                    // Unseen items never sit before the cursor.
                    let ahead = window.items()[cursor..].iter().position(|w| w == item);
                    let Some(skip) = ahead else {
                        continue;
                    };
                    window.remove_range(cursor..cursor + skip)?;
                    stats.stale += skip;
                    vwin_core::warn!(
                        dropped = skip,
                        at = cursor,
                        "window entries out of backing order"
                    );
                }
                if in_range {
                    cursor += 1;
                } else {
                    window.remove_range(cursor..cursor + 1)?;
                    stats.evicted += 1;
                }
            } else if in_range {
                let up = span.midpoint() < midpoint;
                if run_up != Some(up) {
                    stats.runs += 1;
                    run_up = Some(up);
                }
                window.insert(cursor, item.clone())?;
                cursor += 1;
                stats.admitted += 1;
            } else {
                run_up = None;
            }
        }

        if cursor < window.len() {
            let trailing = window.len() - cursor;
            window.remove_range(cursor..window.len())?;
            stats.stale += trailing;
            vwin_core::warn!(dropped = trailing, "window entries missing from backing list");
        }

        let summary = spans.summary();
        stats.all_extents_known = summary.all_extents_known;
        stats.content_extent = summary.content_extent;

        vwin_core::debug!(
            admitted = stats.admitted,
            evicted = stats.evicted,
            stale = stats.stale,
            runs = stats.runs,
            window = window.len(),
            "window pass settled"
        );
        Ok(stats)
    }
}
