#![forbid(unsafe_code)]

//! Change events emitted by a backing list.
//!
//! A [`ListChange`] describes one mutation of an ordered backing list after it
//! has been applied. Indices always refer to the list *after* an insertion and
//! *before* a removal, so `Insert { index, items }` means `items` now occupy
//! `index..index + items.len()`, and `Remove { index, items }` means `items`
//! used to occupy `index..index + items.len()`.
//!
//! `Move` and `Replace` are representable so that adapters can forward every
//! mutation they observe, but windowing consumers reject them: identity- and
//! order-sensitive windowing cannot infer intent from them safely.

use std::fmt;

/// A single mutation of an ordered backing list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange<T> {
    /// The list changed wholesale; consumers must drop derived state.
    Reset,
    /// `items` were inserted and now start at `index`.
    Insert {
        /// Index of the first inserted item.
        index: usize,
        /// Inserted items, in list order.
        items: Vec<T>,
    },
    /// `items` were removed; they previously started at `index`.
    Remove {
        /// Index the first removed item occupied.
        index: usize,
        /// Removed items, in their former list order.
        items: Vec<T>,
    },
    /// An item moved from `from` to `to`.
    Move {
        /// Former index.
        from: usize,
        /// New index.
        to: usize,
        /// The moved item.
        item: T,
    },
    /// The item at `index` was replaced.
    Replace {
        /// Index of the replaced slot.
        index: usize,
        /// The previous occupant.
        old: T,
        /// The new occupant.
        new: T,
    },
}

impl<T> ListChange<T> {
    /// The discriminant of this change, without its payload.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Reset => ChangeKind::Reset,
            Self::Insert { .. } => ChangeKind::Insert,
            Self::Remove { .. } => ChangeKind::Remove,
            Self::Move { .. } => ChangeKind::Move,
            Self::Replace { .. } => ChangeKind::Replace,
        }
    }

    /// Number of items carried by the change.
    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Self::Reset => 0,
            Self::Insert { items, .. } | Self::Remove { items, .. } => items.len(),
            Self::Move { .. } | Self::Replace { .. } => 1,
        }
    }
}

/// Payload-free discriminant of a [`ListChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// See [`ListChange::Reset`].
    Reset,
    /// See [`ListChange::Insert`].
    Insert,
    /// See [`ListChange::Remove`].
    Remove,
    /// See [`ListChange::Move`].
    Move,
    /// See [`ListChange::Replace`].
    Replace,
}

impl ChangeKind {
    /// Stable lowercase name, used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Move => "move",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
