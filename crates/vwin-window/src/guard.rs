#![forbid(unsafe_code)]

//! Scoped re-entrancy guard for window mutations.
//!
//! Each mutating entry point of [`VirtualWindow`](crate::VirtualWindow)
//! acquires a [`MutationGuard`] before touching state. A nested acquisition,
//! for example an observer that reports a measurement while an insert is
//! still being delivered, fails fast with
//! [`InvariantViolation::ReentrantMutation`]. The guard releases on drop, so
//! early returns, `?` propagation, and unwinding all clear it.

use std::cell::Cell;

use vwin_core::InvariantViolation;

/// Tracks which entry point, if any, is currently mutating.
#[derive(Debug, Default)]
pub(crate) struct MutationLock {
    active: Cell<Option<&'static str>>,
}

impl MutationLock {
    /// Acquire the lock for `operation`.
    pub(crate) fn acquire(
        &self,
        operation: &'static str,
    ) -> Result<MutationGuard<'_>, InvariantViolation> {
        if let Some(active) = self.active.get() {
            vwin_core::warn!(operation, active, "re-entrant window mutation rejected");
            return Err(InvariantViolation::ReentrantMutation { operation, active });
        }
        self.active.set(Some(operation));
        Ok(MutationGuard { lock: self })
    }

    /// Entry point currently holding the lock.
    pub(crate) fn active(&self) -> Option<&'static str> {
        self.active.get()
    }
}

/// RAII guard that releases the [`MutationLock`] when dropped.
#[must_use]
#[derive(Debug)]
pub(crate) struct MutationGuard<'a> {
    lock: &'a MutationLock,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.lock.active.set(None);
    }
}
