#![forbid(unsafe_code)]

//! Backing list adapter.
//!
//! [`ObservableList`] owns an ordered `Vec<T>` and announces every mutation to
//! its subscribers as a [`ListChange`]. Listeners run synchronously, after the
//! mutation is applied, and see the new contents alongside the change.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vwin_core::{ListChange, ObservableList};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let mut list = ObservableList::from_vec(vec!['a', 'b']);
//! list.subscribe(move |_items: &[char], change: &ListChange<char>| {
//!     sink.borrow_mut().push(change.kind());
//!     Ok(())
//! });
//! list.insert_range(1, vec!['x']).unwrap();
//!
//! assert_eq!(list.as_slice(), &['a', 'x', 'b']);
//! assert_eq!(seen.borrow().len(), 1);
//! ```

use std::fmt;
use std::ops::Range;

use crate::change::ListChange;
use crate::error::{ArgumentError, Result, check_insertion_index, check_range};

/// Handle returned by [`ObservableList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

type Listener<T> = Box<dyn FnMut(&[T], &ListChange<T>) -> Result<()>>;

/// An ordered list that publishes its mutations.
pub struct ObservableList<T> {
    items: Vec<T>,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: u64,
}

impl<T> Default for ObservableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &self.items)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> ObservableList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list with initial contents. No change is published.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Register a listener; it is called after every mutation.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[T], &ListChange<T>) -> Result<()> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current contents.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Iterate over items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Deliver `change` to every listener. All listeners run; the first error
    /// is returned.
    fn publish(&mut self, change: &ListChange<T>) -> Result<()> {
        let mut first_err = None;
        for (_, listener) in &mut self.listeners {
            if let Err(err) = listener(&self.items, change) {
                crate::warn!(kind = %change.kind(), error = %err, "list listener failed");
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<T: Clone> ObservableList<T> {
    /// Append one item.
    pub fn push(&mut self, item: T) -> Result<()> {
        let index = self.items.len();
        self.insert_range(index, vec![item])
    }

    /// Insert `items` so that they start at `index`.
    ///
    /// Inserting an empty run is a no-op and publishes nothing.
    pub fn insert_range(&mut self, index: usize, items: Vec<T>) -> Result<()> {
        check_insertion_index(index, self.items.len())?;
        if items.is_empty() {
            return Ok(());
        }
        self.items.splice(index..index, items.iter().cloned());
        self.publish(&ListChange::Insert { index, items })
    }

    /// Remove the items in `range` and return them.
    pub fn remove_range(&mut self, range: Range<usize>) -> Result<Vec<T>> {
        check_range(range.start, range.end, self.items.len())?;
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let index = range.start;
        let removed: Vec<T> = self.items.drain(range).collect();
        self.publish(&ListChange::Remove {
            index,
            items: removed.clone(),
        })?;
        Ok(removed)
    }

    /// Remove the item at `index` and return it.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.items.len() {
            return Err(ArgumentError::IndexOutOfRange {
                index,
                len: self.items.len(),
            }
            .into());
        }
        let item = self.items.remove(index);
        self.publish(&ListChange::Remove {
            index,
            items: vec![item.clone()],
        })?;
        Ok(item)
    }

    /// Replace the whole contents and publish a reset.
    pub fn reset(&mut self, items: Vec<T>) -> Result<()> {
        self.items = items;
        self.publish(&ListChange::Reset)
    }

    /// Remove everything and publish a reset.
    pub fn clear(&mut self) -> Result<()> {
        self.reset(Vec::new())
    }

    /// Move the item at `from` so it ends up at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(ArgumentError::IndexOutOfRange { index, len }.into());
            }
        }
        let item = self.items.remove(from);
        self.items.insert(to, item.clone());
        self.publish(&ListChange::Move { from, to, item })
    }

    /// Replace the item at `index`, returning the previous occupant.
    pub fn replace(&mut self, index: usize, item: T) -> Result<T> {
        let len = self.items.len();
        let Some(slot) = self.items.get_mut(index) else {
            return Err(ArgumentError::IndexOutOfRange { index, len }.into());
        };
        let old = std::mem::replace(slot, item.clone());
        self.publish(&ListChange::Replace {
            index,
            old: old.clone(),
            new: item,
        })?;
        Ok(old)
    }
}

impl<T> FromIterator<T> for ObservableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T> AsRef<[T]> for ObservableList<T> {
    fn as_ref(&self) -> &[T] {
        &self.items
    }
}
