#![forbid(unsafe_code)]

//! Position estimation from a partially known height cache.
//!
//! Every item's estimated start is the running sum of the previous items'
//! `extent + spacing`, with unknown extents counted as zero. Estimation is a
//! linear scan over the whole backing list on every call; there is no
//! incremental prefix structure.
//!
//! [`Spans`] streams `(index, item, span)` triples so the windower can scan
//! without allocating, and reports after the fact whether every extent was
//! known.

use std::hash::Hash;

use crate::height_cache::HeightCache;
use crate::viewport::Span;

/// Aggregate result of a full estimation scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// End offset of the last item (0 for an empty list).
    pub content_extent: f64,
    /// Whether every item had a measured extent.
    pub all_extents_known: bool,
    /// Number of items without a measurement.
    pub unknown_count: usize,
}

/// Computes estimated spans for a backing list.
#[derive(Debug)]
pub struct PositionEstimator<'c, T> {
    heights: &'c HeightCache<T>,
    spacing: f64,
}

impl<'c, T: Eq + Hash> PositionEstimator<'c, T> {
    /// Create an estimator over `heights` with `spacing` between items.
    #[must_use]
    pub fn new(heights: &'c HeightCache<T>, spacing: f64) -> Self {
        Self { heights, spacing }
    }

    /// Stream the estimated span of every item in `items`.
    pub fn spans<'i>(&self, items: &'i [T]) -> Spans<'c, 'i, T> {
        Spans {
            heights: self.heights,
            spacing: self.spacing,
            items,
            index: 0,
            cursor: 0.0,
            content_extent: 0.0,
            unknown: 0,
        }
    }

    /// Run a full scan and summarize it.
    #[must_use]
    pub fn estimate(&self, items: &[T]) -> Estimate {
        let mut spans = self.spans(items);
        for _ in spans.by_ref() {}
        spans.summary()
    }

    /// Estimated span of the item at `index`, scanning from the start.
    #[must_use]
    pub fn span_of(&self, items: &[T], index: usize) -> Option<Span> {
        self.spans(items)
            .nth(index)
            .map(|(_, _, span)| span)
    }

    /// Estimated start offset of the item at `index`.
    #[must_use]
    pub fn offset_of(&self, items: &[T], index: usize) -> Option<f64> {
        self.span_of(items, index).map(|span| span.start)
    }
}

/// Streaming span iterator; see [`PositionEstimator::spans`].
#[derive(Debug)]
pub struct Spans<'c, 'i, T> {
    heights: &'c HeightCache<T>,
    spacing: f64,
    items: &'i [T],
    index: usize,
    cursor: f64,
    content_extent: f64,
    unknown: usize,
}

impl<T: Eq + Hash> Spans<'_, '_, T> {
    /// Whether every item yielded so far had a measured extent.
    #[must_use]
    pub fn all_extents_known(&self) -> bool {
        self.unknown == 0
    }

    /// Summary of the items yielded so far. Call after exhausting the
    /// iterator for whole-list figures.
    #[must_use]
    pub fn summary(&self) -> Estimate {
        Estimate {
            content_extent: self.content_extent,
            all_extents_known: self.all_extents_known(),
            unknown_count: self.unknown,
        }
    }
}

impl<'i, T: Eq + Hash> Iterator for Spans<'_, 'i, T> {
    type Item = (usize, &'i T, Span);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.index)?;
        let index = self.index;
        self.index += 1;

        let extent = match self.heights.get(item) {
            Some(extent) => extent,
            None => {
                self.unknown += 1;
                0.0
            }
        };
        let span = Span::new(self.cursor, extent);
        self.content_extent = span.end;
        self.cursor = span.end + self.spacing;
        Some((index, item, span))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T: Eq + Hash> ExactSizeIterator for Spans<'_, '_, T> {}
