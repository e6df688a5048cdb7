#![forbid(unsafe_code)]

//! The rendered window: the ordered set of materialized items.
//!
//! [`RenderedWindow`] is an ordered, duplicate-free sequence with an O(1)
//! membership index. Every mutation is recorded as a [`WindowChange`] that a
//! host renderer replays to create or destroy item views. Adjacent compatible
//! changes are coalesced, so a run of admissions at consecutive positions is
//! one `Inserted` change.
//!
//! Range entry points validate their arguments before touching any state.

use std::hash::Hash;
use std::ops::Range;

use rustc_hash::FxHashSet;
use vwin_core::error::{check_insertion_index, check_range};
use vwin_core::{InvariantViolation, Result};

/// A mutation of the rendered window, expressed against the window's own
/// indices at the time it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowChange<T> {
    /// `items` now occupy `index..index + items.len()`.
    Inserted {
        /// Window index of the first inserted item.
        index: usize,
        /// Inserted items, in window order.
        items: Vec<T>,
    },
    /// `items` used to occupy `index..index + items.len()`.
    Removed {
        /// Window index of the first removed item.
        index: usize,
        /// Removed items, in their former window order.
        items: Vec<T>,
    },
    /// The window was emptied.
    Reset,
}

impl<T> WindowChange<T> {
    /// Number of items carried by the change.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Inserted { items, .. } | Self::Removed { items, .. } => items.len(),
            Self::Reset => 0,
        }
    }

    /// Whether the change carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered, duplicate-free window of materialized items.
#[derive(Debug, Clone)]
pub struct RenderedWindow<T> {
    items: Vec<T>,
    members: FxHashSet<T>,
    changes: Vec<WindowChange<T>>,
}

impl<T> Default for RenderedWindow<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            members: FxHashSet::default(),
            changes: Vec::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> RenderedWindow<T> {
    /// Create an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in window order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of windowed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at window index `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// O(1) membership test.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.members.contains(item)
    }

    /// Window index of `item`. Linear in the window size, which is small.
    #[must_use]
    pub fn position(&self, item: &T) -> Option<usize> {
        if !self.contains(item) {
            return None;
        }
        self.items.iter().position(|it| it == item)
    }

    /// Insert `run` so that it starts at window index `index`.
    ///
    /// Fails without mutating if `index` is past the end or if any item of
    /// `run` is already windowed (or repeated within `run`).
    pub fn insert_run(&mut self, index: usize, run: Vec<T>) -> Result<()> {
        check_insertion_index(index, self.items.len())?;
        if run.is_empty() {
            return Ok(());
        }
        let mut incoming = FxHashSet::default();
        for (offset, item) in run.iter().enumerate() {
            if self.members.contains(item) || !incoming.insert(item) {
                return Err(InvariantViolation::DuplicateItem {
                    index: index + offset,
                }
                .into());
            }
        }

        self.members.extend(run.iter().cloned());
        self.items.splice(index..index, run.iter().cloned());
        self.record(WindowChange::Inserted { index, items: run });
        Ok(())
    }

    /// Insert a single item at window index `index`.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        self.insert_run(index, vec![item])
    }

    /// Remove the items at window indices `range` as one operation.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<Vec<T>> {
        check_range(range.start, range.end, self.items.len())?;
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let index = range.start;
        let removed: Vec<T> = self.items.drain(range).collect();
        for item in &removed {
            self.members.remove(item);
        }
        self.record(WindowChange::Removed {
            index,
            items: removed.clone(),
        });
        Ok(removed)
    }

    /// Remove `item` if it is windowed. Returns whether it was present.
    pub fn remove_item(&mut self, item: &T) -> bool {
        let Some(index) = self.position(item) else {
            return false;
        };
        let removed = self.items.remove(index);
        self.members.remove(&removed);
        self.record(WindowChange::Removed {
            index,
            items: vec![removed],
        });
        true
    }

    /// Empty the window.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.members.clear();
        // Pending changes describe items that no longer exist.
        self.changes.clear();
        self.changes.push(WindowChange::Reset);
    }

    /// Whether changes are waiting to be drained.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Drain the recorded changes, oldest first.
    pub fn take_changes(&mut self) -> Vec<WindowChange<T>> {
        std::mem::take(&mut self.changes)
    }

    fn record(&mut self, change: WindowChange<T>) {
        let change = match (self.changes.last_mut(), change) {
            (
                Some(WindowChange::Inserted { index, items }),
                WindowChange::Inserted {
                    index: next,
                    items: more,
                },
            ) if *index + items.len() == next => {
                items.extend(more);
                return;
            }
            (
                Some(WindowChange::Removed { index, items }),
                WindowChange::Removed {
                    index: next,
                    items: more,
                },
            ) if *index == next => {
                items.extend(more);
                return;
            }
            (_, change) => change,
        };
        self.changes.push(change);
    }
}
