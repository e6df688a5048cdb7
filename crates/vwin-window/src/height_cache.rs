#![forbid(unsafe_code)]

//! Identity-keyed cache of measured item extents.
//!
//! Entries are keyed by item identity, never by position, so insertions and
//! removals in the backing list do not invalidate them. Entries for items
//! that leave the window (or the list) are kept so re-entering items need no
//! re-measurement; the only eviction is a full [`HeightCache::clear`].
//! Memory is therefore bounded by the number of distinct items ever
//! measured, at one `f64` per item.

use std::hash::Hash;

use rustc_hash::FxHashMap;
use vwin_core::ArgumentError;
use vwin_core::error::check_extent;

/// Last measured extent per item identity.
#[derive(Debug, Clone)]
pub struct HeightCache<T> {
    extents: FxHashMap<T, f64>,
}

impl<T> Default for HeightCache<T> {
    fn default() -> Self {
        Self {
            extents: FxHashMap::default(),
        }
    }
}

impl<T: Eq + Hash> HeightCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Measured extent of `item`, or `None` when unknown.
    #[must_use]
    pub fn get(&self, item: &T) -> Option<f64> {
        self.extents.get(item).copied()
    }

    /// Extent of `item`, treating unknown as zero.
    #[must_use]
    pub fn extent_or_zero(&self, item: &T) -> f64 {
        self.get(item).unwrap_or(0.0)
    }

    /// Record a measurement. Last writer wins.
    ///
    /// Returns whether the stored value changed. Negative or non-finite
    /// extents are rejected without touching the cache.
    pub fn set(&mut self, item: T, extent: f64) -> Result<bool, ArgumentError> {
        let extent = check_extent(extent)?;
        let previous = self.extents.insert(item, extent);
        Ok(previous != Some(extent))
    }

    /// Drop the entry for `item`.
    pub fn remove(&mut self, item: &T) -> Option<f64> {
        self.extents.remove(item)
    }

    /// Whether `item` has a measurement.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.extents.contains_key(item)
    }

    /// Number of measured items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    /// Whether nothing has been measured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Drop every measurement.
    pub fn clear(&mut self) {
        self.extents.clear();
    }
}
