#![forbid(unsafe_code)]

//! Translate backing-list change events into window mutations.
//!
//! Window indices are unrelated to backing indices, so insertions locate
//! their slot by searching the window for an anchor rather than mapping
//! indices directly. Removals touch only windowed items and batch contiguous
//! runs into single range removals.
//!
//! `Move` and `Replace` are rejected outright: applying half of an
//! order-sensitive change would silently break the subsequence invariant.

use std::hash::Hash;
use std::ops::Range;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use vwin_core::{ArgumentError, ChangeKind, ListChange, Result, VirtualizeError};

use crate::rendered::RenderedWindow;

/// What a change did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Kind of the applied change.
    pub kind: ChangeKind,
    /// Items added to the window.
    pub inserted: usize,
    /// Items removed from the window.
    pub removed: usize,
    /// Discrete window mutations performed.
    pub mutations: usize,
}

impl DiffOutcome {
    fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            inserted: 0,
            removed: 0,
            mutations: 0,
        }
    }
}

/// Applies [`ListChange`]s to a [`RenderedWindow`].
#[derive(Debug)]
pub struct DiffApplier<'a, T> {
    items: &'a [T],
}

impl<'a, T: Clone + Eq + Hash> DiffApplier<'a, T> {
    /// Create an applier for `items`, the backing list *after* the change.
    #[must_use]
    pub fn new(items: &'a [T]) -> Self {
        Self { items }
    }

    /// Apply `change` to `window`.
    ///
    /// Arguments are validated before the window is touched; `Move` and
    /// `Replace` return [`VirtualizeError::UnsupportedOperation`] and leave
    /// the window unchanged.
    pub fn apply(
        &self,
        change: &ListChange<T>,
        window: &mut RenderedWindow<T>,
    ) -> Result<DiffOutcome> {
        let _span = vwin_core::debug_span!(
            "window_diff",
            kind = change.kind().as_str(),
            count = change.item_count()
        )
        .entered();

        match change {
            ListChange::Reset => {
                let removed = window.len();
                window.clear();
                Ok(DiffOutcome {
                    removed,
                    mutations: usize::from(removed > 0),
                    ..DiffOutcome::new(ChangeKind::Reset)
                })
            }
            ListChange::Insert { index, items } => self.insert(*index, items, window),
            ListChange::Remove { index, items } => self.remove(*index, items, window),
            ListChange::Move { .. } | ListChange::Replace { .. } => {
                vwin_core::warn!(kind = change.kind().as_str(), "rejected unsupported change");
                Err(VirtualizeError::UnsupportedOperation(change.kind()))
            }
        }
    }

    fn insert(
        &self,
        index: usize,
        new_items: &[T],
        window: &mut RenderedWindow<T>,
    ) -> Result<DiffOutcome> {
        let end = index.checked_add(new_items.len());
        if end.is_none_or(|end| end > self.items.len()) {
            return Err(ArgumentError::ChangeOutOfBounds {
                kind: ChangeKind::Insert,
                index,
                count: new_items.len(),
                len: self.items.len(),
            }
            .into());
        }

        let mut outcome = DiffOutcome::new(ChangeKind::Insert);
        let mut seen = FxHashSet::default();
        let fresh: Vec<T> = new_items
            .iter()
            .filter(|item| !window.contains(item) && seen.insert(*item))
            .cloned()
            .collect();
        if fresh.len() < new_items.len() {
            vwin_core::debug!(
                dropped = new_items.len() - fresh.len(),
                "insert carried already windowed items"
            );
        }
        if fresh.is_empty() {
            return Ok(outcome);
        }

        let at = self.anchor(index, window);
        outcome.inserted = fresh.len();
        outcome.mutations = 1;
        window.insert_run(at, fresh)?;
        Ok(outcome)
    }

    /// Window index at which a run inserted at backing `index` belongs.
    ///
    /// The first window item that is either the backing predecessor of the
    /// run (insert after it) or lies after the run start (insert before it)
    /// decides. Without an anchor the run is appended.
    fn anchor(&self, index: usize, window: &RenderedWindow<T>) -> usize {
        let mut source_index: FxHashMap<&T, usize> = FxHashMap::default();
        source_index.reserve(self.items.len());
        for (i, item) in self.items.iter().enumerate() {
            source_index.entry(item).or_insert(i);
        }

        let predecessor = index.checked_sub(1);
        for (pos, item) in window.items().iter().enumerate() {
            let Some(&source) = source_index.get(item) else {
                continue;
            };
            if Some(source) == predecessor {
                return pos + 1;
            }
            if source > index {
                return pos;
            }
        }
        window.len()
    }

    fn remove(
        &self,
        index: usize,
        old_items: &[T],
        window: &mut RenderedWindow<T>,
    ) -> Result<DiffOutcome> {
        if index > self.items.len() {
            return Err(ArgumentError::ChangeOutOfBounds {
                kind: ChangeKind::Remove,
                index,
                count: old_items.len(),
                len: self.items.len(),
            }
            .into());
        }

        let mut outcome = DiffOutcome::new(ChangeKind::Remove);
        match old_items {
            [] => {}
            [single] => {
                if window.remove_item(single) {
                    outcome.removed = 1;
                    outcome.mutations = 1;
                }
            }
            many => {
                let doomed: FxHashSet<&T> = many.iter().collect();
                let runs = matching_runs(window.items(), &doomed);
                // Back to front so earlier ranges keep their indices.
                for range in runs.into_iter().rev() {
                    outcome.removed += range.len();
                    outcome.mutations += 1;
                    window.remove_range(range)?;
                }
            }
        }
        vwin_core::trace!(
            removed = outcome.removed,
            ranges = outcome.mutations,
            "removal applied"
        );
        Ok(outcome)
    }
}

/// Maximal runs of consecutive window entries contained in `doomed`.
fn matching_runs<T: Eq + Hash>(
    window: &[T],
    doomed: &FxHashSet<&T>,
) -> SmallVec<[Range<usize>; 4]> {
    let mut runs = SmallVec::new();
    let mut start = None;
    for (pos, item) in window.iter().enumerate() {
        match (doomed.contains(item), start) {
            (true, None) => start = Some(pos),
            (false, Some(s)) => {
                runs.push(s..pos);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(s..window.len());
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendered::WindowChange;

    fn window_of(items: &[char]) -> RenderedWindow<char> {
        let mut window = RenderedWindow::new();
        window.insert_run(0, items.to_vec()).unwrap();
        window.take_changes();
        window
    }

    fn insert(index: usize, items: &[char]) -> ListChange<char> {
        ListChange::Insert {
            index,
            items: items.to_vec(),
        }
    }

    fn remove(index: usize, items: &[char]) -> ListChange<char> {
        ListChange::Remove {
            index,
            items: items.to_vec(),
        }
    }

    #[test]
    fn insert_anchors_after_predecessor() {
        let backing = ['A', 'B', 'F', 'G', 'C', 'D', 'E'];
        let mut window = window_of(&['A', 'B', 'C']);

        let outcome = DiffApplier::new(&backing)
            .apply(&insert(2, &['F', 'G']), &mut window)
            .unwrap();

        assert_eq!(window.items(), &['A', 'B', 'F', 'G', 'C']);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(
            window.take_changes(),
            vec![WindowChange::Inserted {
                index: 2,
                items: vec!['F', 'G']
            }]
        );
    }

    #[test]
    fn insert_before_first_later_item() {
        // Predecessor 'A' is not windowed; 'C' lies after the run.
        let backing = ['A', 'X', 'B', 'C'];
        let mut window = window_of(&['C']);

        DiffApplier::new(&backing)
            .apply(&insert(1, &['X']), &mut window)
            .unwrap();

        assert_eq!(window.items(), &['X', 'C']);
    }

    #[test]
    fn insert_at_front() {
        let backing = ['N', 'A', 'B'];
        let mut window = window_of(&['A', 'B']);

        DiffApplier::new(&backing)
            .apply(&insert(0, &['N']), &mut window)
            .unwrap();

        assert_eq!(window.items(), &['N', 'A', 'B']);
    }

    #[test]
    fn insert_without_anchor_appends() {
        let backing = ['A', 'B', 'C', 'D', 'Z'];
        let mut window = window_of(&['A', 'B']);

        DiffApplier::new(&backing)
            .apply(&insert(4, &['Z']), &mut window)
            .unwrap();

        assert_eq!(window.items(), &['A', 'B', 'Z']);
    }

    #[test]
    fn insert_skips_windowed_items() {
        let backing = ['A', 'B', 'C'];
        let mut window = window_of(&['A', 'B']);

        let outcome = DiffApplier::new(&backing)
            .apply(&insert(1, &['B']), &mut window)
            .unwrap();

        assert_eq!(outcome.inserted, 0);
        assert_eq!(window.items(), &['A', 'B']);
        assert!(!window.has_pending_changes());
    }

    #[test]
    fn insert_out_of_bounds_is_rejected() {
        let backing = ['A', 'B'];
        let mut window = window_of(&['A']);

        let err = DiffApplier::new(&backing)
            .apply(&insert(1, &['B', 'C']), &mut window)
            .unwrap_err();

        assert!(err.is_recoverable());
        assert_eq!(window.items(), &['A']);
    }

    #[test]
    fn single_removal_is_direct() {
        let backing = ['A', 'C'];
        let mut window = window_of(&['A', 'B', 'C']);
        let applier = DiffApplier::new(&backing);

        let outcome = applier.apply(&remove(1, &['B']), &mut window).unwrap();
        assert_eq!(outcome.removed, 1);
        assert_eq!(window.items(), &['A', 'C']);

        // Not windowed: nothing to do.
        let outcome = applier.apply(&remove(2, &['Q']), &mut window).unwrap();
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.mutations, 0);
    }

    #[test]
    fn multi_removal_batches_runs() {
        let backing = ['A', 'D', 'G'];
        let mut window = window_of(&['A', 'B', 'C', 'D', 'E', 'F', 'G']);

        let outcome = DiffApplier::new(&backing)
            .apply(&remove(1, &['B', 'C', 'E', 'F', 'X']), &mut window)
            .unwrap();

        assert_eq!(window.items(), &['A', 'D', 'G']);
        assert_eq!(outcome.removed, 4);
        assert_eq!(outcome.mutations, 2);
        assert_eq!(
            window.take_changes(),
            vec![
                WindowChange::Removed {
                    index: 4,
                    items: vec!['E', 'F']
                },
                WindowChange::Removed {
                    index: 1,
                    items: vec!['B', 'C']
                },
            ]
        );
    }

    #[test]
    fn reset_clears_window() {
        let backing: [char; 0] = [];
        let mut window = window_of(&['A', 'B']);

        let outcome = DiffApplier::new(&backing)
            .apply(&ListChange::Reset, &mut window)
            .unwrap();

        assert!(window.is_empty());
        assert_eq!(outcome.removed, 2);
        assert_eq!(window.take_changes(), vec![WindowChange::Reset]);
    }

    #[test]
    fn move_and_replace_are_unsupported() {
        let backing = ['B', 'A'];
        let mut window = window_of(&['A', 'B']);
        let applier = DiffApplier::new(&backing);

        let err = applier
            .apply(
                &ListChange::Move {
                    from: 0,
                    to: 1,
                    item: 'A',
                },
                &mut window,
            )
            .unwrap_err();
        assert_eq!(err, VirtualizeError::UnsupportedOperation(ChangeKind::Move));

        let err = applier
            .apply(
                &ListChange::Replace {
                    index: 0,
                    old: 'A',
                    new: 'Z',
                },
                &mut window,
            )
            .unwrap_err();
        assert_eq!(err, VirtualizeError::UnsupportedOperation(ChangeKind::Replace));

        assert_eq!(window.items(), &['A', 'B']);
        assert!(!window.has_pending_changes());
    }

    #[test]
    fn matching_runs_are_maximal() {
        let window = [1, 2, 3, 4, 5, 6];
        let doomed_items = [1, 2, 4, 6];
        let doomed: FxHashSet<&i32> = doomed_items.iter().collect();
        let runs = matching_runs(&window, &doomed);
        assert_eq!(runs.as_slice(), &[0..2, 3..4, 5..6]);
    }
}
