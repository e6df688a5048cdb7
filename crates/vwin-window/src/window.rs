#![forbid(unsafe_code)]

//! Host-facing facade tying the windowing engine together.
//!
//! [`VirtualWindow`] owns the rendered window, the height cache, and the
//! viewport state behind `&self` entry points, so a single `Rc` handle can be
//! shared between the host's scroll handler, its measurement callback, and a
//! backing list subscription.
//!
//! Every mutating entry point holds a scoped mutation guard for its
//! whole duration, including observer dispatch. Observers may read the window
//! while they are notified but any attempt to mutate it fails with
//! [`InvariantViolation::ReentrantMutation`].
//!
//! # Example
//!
//! ```
//! use vwin_window::{VirtualWindow, WindowConfig};
//!
//! let items = ['A', 'B', 'C', 'D', 'E'];
//! let window = VirtualWindow::new(WindowConfig::new().with_buffer_margin(0.0)).unwrap();
//! for item in items {
//!     window.report_extent(item, 100.0).unwrap();
//! }
//!
//! window.on_viewport_resize(&items, 250.0).unwrap();
//! assert_eq!(window.rendered(), vec!['A', 'B', 'C']);
//!
//! window.on_scroll(&items, 150.0).unwrap();
//! assert_eq!(window.rendered(), vec!['B', 'C', 'D']);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use vwin_core::{ArgumentError, InvariantViolation, ListChange, Result};

use crate::config::WindowConfig;
use crate::diff::{DiffApplier, DiffOutcome};
use crate::guard::MutationLock;
use crate::height_cache::HeightCache;
use crate::rendered::{RenderedWindow, WindowChange};
use crate::viewport::ViewportState;
use crate::windower::{PassStats, Windower};

/// Handle returned by [`VirtualWindow::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

type Observer<T> = Box<dyn FnMut(&WindowChange<T>)>;

#[derive(Debug)]
struct State<T> {
    config: WindowConfig,
    viewport: ViewportState,
    rendered: RenderedWindow<T>,
    heights: HeightCache<T>,
    content_extent: f64,
}

impl<T: Clone + Eq + Hash> State<T> {
    fn pass(&mut self, items: &[T]) -> Result<PassStats> {
        let stats = Windower::new(&self.heights, self.config.item_spacing, self.viewport)
            .run(items, &mut self.rendered)?;
        if stats.all_extents_known {
            self.content_extent = stats.content_extent;
        }
        Ok(stats)
    }
}

/// A virtualized window over a host-owned backing list.
pub struct VirtualWindow<T> {
    state: RefCell<State<T>>,
    lock: MutationLock,
    observers: RefCell<Vec<(ObserverId, Observer<T>)>>,
    next_observer: Cell<u64>,
}

impl<T: fmt::Debug> fmt::Debug for VirtualWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualWindow")
            .field("state", &self.state)
            .field("mutating", &self.lock.active())
            .field("observers", &self.observers.try_borrow().map(|o| o.len()).ok())
            .finish()
    }
}

impl<T: Clone + Eq + Hash> Default for VirtualWindow<T> {
    fn default() -> Self {
        Self::with_valid_config(WindowConfig::default())
    }
}

impl<T: Clone + Eq + Hash> VirtualWindow<T> {
    /// Create an empty window. The viewport starts at offset 0 with no
    /// visible extent, so nothing is materialized until the host reports its
    /// size through [`on_viewport_resize`](Self::on_viewport_resize).
    ///
    /// A config rejected by [`WindowConfig::validate`] fails with
    /// [`ArgumentError::InvalidExtent`] carrying the first offending value.
    pub fn new(config: WindowConfig) -> Result<Self> {
        config.validate().map_err(|errors| {
            vwin_core::warn!(errors = errors.len(), "rejected window config");
            let value = match errors.first().map(|error| error.field) {
                Some("buffer_margin") => config.buffer_margin,
                _ => config.item_spacing,
            };
            ArgumentError::InvalidExtent(value)
        })?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: WindowConfig) -> Self {
        Self {
            state: RefCell::new(State {
                config,
                viewport: ViewportState::new(0.0, 0.0, config.buffer_margin),
                rendered: RenderedWindow::new(),
                heights: HeightCache::new(),
                content_extent: 0.0,
            }),
            lock: MutationLock::default(),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        }
    }

    // ── Mutating entry points ───────────────────────────────────────────

    /// Scroll to `offset` and run a windowing pass over `items`.
    ///
    /// Negative offsets clamp to zero; non-finite ones are rejected before
    /// anything changes.
    pub fn on_scroll(&self, items: &[T], offset: f64) -> Result<PassStats> {
        self.mutate("on_scroll", |state| {
            state.viewport.set_scroll_offset(offset)?;
            state.pass(items)
        })
    }

    /// Apply a new visible extent and run a windowing pass over `items`.
    pub fn on_viewport_resize(&self, items: &[T], extent: f64) -> Result<PassStats> {
        self.mutate("on_viewport_resize", |state| {
            state.viewport.set_visible_extent(extent)?;
            state.pass(items)
        })
    }

    /// Run a windowing pass with the current viewport, typically after a
    /// batch of [`report_extent`](Self::report_extent) calls.
    pub fn refresh(&self, items: &[T]) -> Result<PassStats> {
        self.mutate("refresh", |state| state.pass(items))
    }

    /// Record the measured extent of `item`. Returns whether the cached value
    /// changed.
    ///
    /// The window is not re-evaluated until the next pass.
    pub fn report_extent(&self, item: T, extent: f64) -> Result<bool> {
        self.mutate("report_extent", |state| Ok(state.heights.set(item, extent)?))
    }

    /// Apply a backing list change. `items` is the list *after* the change.
    pub fn apply_change(&self, items: &[T], change: &ListChange<T>) -> Result<DiffOutcome> {
        self.mutate("apply_change", |state| {
            DiffApplier::new(items).apply(change, &mut state.rendered)
        })
    }

    /// Forget everything tied to the previous backing list: the window is
    /// emptied and every cached measurement dropped.
    pub fn swap_source(&self) -> Result<()> {
        self.mutate("swap_source", |state| {
            state.rendered.clear();
            state.heights.clear();
            state.content_extent = 0.0;
            vwin_core::debug!("backing source swapped");
            Ok(())
        })
    }

    /// Drop every cached measurement, for example after a template change
    /// that alters item extents. The window itself is kept.
    pub fn invalidate_measurements(&self) -> Result<()> {
        self.mutate("invalidate_measurements", |state| {
            vwin_core::debug!(dropped = state.heights.len(), "measurements invalidated");
            state.heights.clear();
            Ok(())
        })
    }

    /// Register an observer of window changes.
    ///
    /// Fails when called from inside a notification.
    pub fn subscribe<F>(&self, observer: F) -> Result<ObserverId>
    where
        F: FnMut(&WindowChange<T>) + 'static,
    {
        let _guard = self.lock.acquire("subscribe")?;
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        self.observers.borrow_mut().push((id, Box::new(observer)));
        Ok(id)
    }

    /// Remove an observer. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: ObserverId) -> Result<bool> {
        let _guard = self.lock.acquire("unsubscribe")?;
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        Ok(observers.len() != before)
    }

    // ── Readers ─────────────────────────────────────────────────────────

    /// Snapshot of the windowed items, in order.
    #[must_use]
    pub fn rendered(&self) -> Vec<T> {
        self.with_rendered(<[T]>::to_vec)
    }

    /// Borrow the windowed items without copying.
    ///
    /// The window stays borrowed while `f` runs: a mutating call from inside
    /// `f` fails with [`InvariantViolation::ReentrantMutation`].
    pub fn with_rendered<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(self.state.borrow().rendered.items())
    }

    /// Whether `item` is currently windowed.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.state.borrow().rendered.contains(item)
    }

    /// Number of windowed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.borrow().rendered.len()
    }

    /// Whether nothing is windowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.borrow().rendered.is_empty()
    }

    /// Cached extent of `item`.
    #[must_use]
    pub fn extent_of(&self, item: &T) -> Option<f64> {
        self.state.borrow().heights.get(item)
    }

    /// Total content extent from the last pass in which every item was
    /// measured.
    #[must_use]
    pub fn content_extent(&self) -> f64 {
        self.state.borrow().content_extent
    }

    /// Current viewport state.
    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.state.borrow().viewport
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> WindowConfig {
        self.state.borrow().config
    }

    /// Whether a mutating entry point is in progress.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        self.lock.active().is_some()
    }

    /// Check that the window is an ordered subsequence of `items`.
    pub fn validate_against(&self, items: &[T]) -> Result<()> {
        let state = self.state.borrow();
        let mut source = items.iter();
        for (index, item) in state.rendered.items().iter().enumerate() {
            if !source.any(|candidate| candidate == item) {
                return Err(InvariantViolation::WindowOutOfOrder { index }.into());
            }
        }
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn mutate<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut State<T>) -> Result<R>,
    ) -> Result<R> {
        let _guard = self.lock.acquire(operation)?;
        let (result, changes) = {
            let Ok(mut state) = self.state.try_borrow_mut() else {
                vwin_core::warn!(operation, "mutation while the window is borrowed for reading");
                return Err(InvariantViolation::ReentrantMutation {
                    operation,
                    active: "with_rendered",
                }
                .into());
            };
            let result = f(&mut state);
            (result, state.rendered.take_changes())
        };
        if !changes.is_empty() {
            self.notify(&changes);
        }
        result
    }

    fn notify(&self, changes: &[WindowChange<T>]) {
        // Observer registration takes the mutation lock, which is held here.
        let mut observers = self.observers.borrow_mut();
        vwin_core::trace!(
            changes = changes.len(),
            observers = observers.len(),
            "dispatching window changes"
        );
        for change in changes {
            for (_, observer) in observers.iter_mut() {
                observer(change);
            }
        }
    }
}

impl<T: Clone + Eq + Hash + 'static> VirtualWindow<T> {
    /// Listener that forwards backing list changes into `this`.
    ///
    /// Plug it into [`ObservableList::subscribe`](vwin_core::ObservableList::subscribe).
    /// The listener holds a weak reference and becomes a no-op once the window
    /// is dropped.
    pub fn change_listener(
        this: &Rc<Self>,
    ) -> impl FnMut(&[T], &ListChange<T>) -> Result<()> + 'static {
        let weak = Rc::downgrade(this);
        move |items: &[T], change: &ListChange<T>| match weak.upgrade() {
            Some(window) => window.apply_change(items, change).map(drop),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vwin_core::{ChangeKind, ObservableList, VirtualizeError};

    const ABCDE: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

    fn measured(items: &[char], extent: f64) -> VirtualWindow<char> {
        let window = VirtualWindow::new(WindowConfig::new().with_buffer_margin(0.0)).unwrap();
        for &item in items {
            window.report_extent(item, extent).unwrap();
        }
        window
    }

    fn recorder(window: &VirtualWindow<char>) -> Rc<RefCell<Vec<WindowChange<char>>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        window
            .subscribe(move |change: &WindowChange<char>| sink.borrow_mut().push(change.clone()))
            .unwrap();
        log
    }

    #[test]
    fn scroll_scenario_notifies_observers() {
        let window = measured(&ABCDE, 100.0);
        let log = recorder(&window);

        window.on_viewport_resize(&ABCDE, 250.0).unwrap();
        assert_eq!(window.rendered(), vec!['A', 'B', 'C']);
        assert_eq!(window.content_extent(), 500.0);
        log.borrow_mut().clear();

        window.on_scroll(&ABCDE, 150.0).unwrap();
        assert_eq!(window.rendered(), vec!['B', 'C', 'D']);
        assert_eq!(
            *log.borrow(),
            vec![
                WindowChange::Removed {
                    index: 0,
                    items: vec!['A']
                },
                WindowChange::Inserted {
                    index: 2,
                    items: vec!['D']
                },
            ]
        );
        assert!(window.validate_against(&ABCDE).is_ok());
    }

    #[test]
    fn observer_mutation_is_reentrant() {
        let window = Rc::new(measured(&ABCDE, 100.0));
        let weak = Rc::downgrade(&window);
        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&errors);
        window
            .subscribe(move |_: &WindowChange<char>| {
                let Some(window) = weak.upgrade() else { return };
                assert!(window.is_mutating());
                // Reads are fine during dispatch.
                let _ = window.len();
                if let Err(err) = window.report_extent('A', 10.0) {
                    sink.borrow_mut().push(err);
                }
            })
            .unwrap();

        window.on_viewport_resize(&ABCDE, 250.0).unwrap();

        assert_eq!(
            errors.borrow()[0],
            VirtualizeError::InvariantViolation(InvariantViolation::ReentrantMutation {
                operation: "report_extent",
                active: "on_viewport_resize",
            })
        );
        assert_eq!(window.extent_of(&'A'), Some(100.0));
        assert!(!window.is_mutating());
    }

    #[test]
    fn list_changes_flow_into_window() {
        let window = Rc::new(measured(&['A', 'B', 'C', 'D', 'E', 'F', 'G'], 100.0));
        let mut list = ObservableList::from_vec(ABCDE.to_vec());
        window.on_viewport_resize(list.as_slice(), 250.0).unwrap();
        list.subscribe(VirtualWindow::change_listener(&window));

        list.insert_range(2, vec!['F', 'G']).unwrap();
        assert_eq!(window.rendered(), vec!['A', 'B', 'F', 'G', 'C']);

        list.remove_range(2..4).unwrap();
        assert_eq!(window.rendered(), vec!['A', 'B', 'C']);

        list.remove(0).unwrap();
        assert_eq!(window.rendered(), vec!['B', 'C']);
        assert!(window.validate_against(list.as_slice()).is_ok());

        list.clear().unwrap();
        assert!(window.is_empty());
        // Reset keeps measurements.
        assert_eq!(window.extent_of(&'A'), Some(100.0));
    }

    #[test]
    fn move_is_rejected_and_window_kept() {
        let window = Rc::new(measured(&ABCDE, 100.0));
        let mut list = ObservableList::from_vec(ABCDE.to_vec());
        window.on_viewport_resize(list.as_slice(), 250.0).unwrap();
        list.subscribe(VirtualWindow::change_listener(&window));

        let err = list.move_item(0, 4).unwrap_err();
        assert_eq!(err, VirtualizeError::UnsupportedOperation(ChangeKind::Move));
        let err = list.replace(1, 'Z').unwrap_err();
        assert_eq!(err, VirtualizeError::UnsupportedOperation(ChangeKind::Replace));

        assert_eq!(window.rendered(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn content_extent_waits_for_all_measurements() {
        let window = VirtualWindow::new(WindowConfig::new().with_buffer_margin(0.0)).unwrap();
        window.report_extent('A', 100.0).unwrap();
        window.on_viewport_resize(&ABCDE, 250.0).unwrap();
        assert_eq!(window.content_extent(), 0.0);

        for item in ['B', 'C', 'D', 'E'] {
            window.report_extent(item, 50.0).unwrap();
        }
        let stats = window.refresh(&ABCDE).unwrap();
        assert!(stats.all_extents_known);
        assert_eq!(window.content_extent(), 300.0);
    }

    #[test]
    fn report_extent_reports_changes() {
        let window = VirtualWindow::<char>::default();
        assert!(window.report_extent('A', 10.0).unwrap());
        assert!(!window.report_extent('A', 10.0).unwrap());
        assert!(window.report_extent('A', 12.0).unwrap());
        assert_eq!(
            window.report_extent('A', -1.0).unwrap_err(),
            VirtualizeError::Argument(ArgumentError::InvalidExtent(-1.0))
        );
        assert_eq!(window.extent_of(&'A'), Some(12.0));
    }

    #[test]
    fn invalid_offset_leaves_state_untouched() {
        let window = measured(&ABCDE, 100.0);
        window.on_viewport_resize(&ABCDE, 250.0).unwrap();

        let err = window.on_scroll(&ABCDE, f64::NAN).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(window.viewport().scroll_offset, 0.0);
        assert_eq!(window.rendered(), vec!['A', 'B', 'C']);

        window.on_scroll(&ABCDE, -40.0).unwrap();
        assert_eq!(window.viewport().scroll_offset, 0.0);
    }

    #[test]
    fn swap_source_clears_window_and_cache() {
        let window = measured(&ABCDE, 100.0);
        let log = recorder(&window);
        window.on_viewport_resize(&ABCDE, 250.0).unwrap();

        window.swap_source().unwrap();

        assert!(window.is_empty());
        assert_eq!(window.extent_of(&'A'), None);
        assert_eq!(window.content_extent(), 0.0);
        assert_eq!(log.borrow().last(), Some(&WindowChange::Reset));
    }

    #[test]
    fn invalidate_measurements_keeps_window() {
        let window = measured(&ABCDE, 100.0);
        window.on_viewport_resize(&ABCDE, 250.0).unwrap();

        window.invalidate_measurements().unwrap();

        assert_eq!(window.extent_of(&'B'), None);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let window = measured(&ABCDE, 100.0);
        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let id = window
            .subscribe(move |_: &WindowChange<char>| sink.set(sink.get() + 1))
            .unwrap();

        window.on_viewport_resize(&ABCDE, 100.0).unwrap();
        assert_eq!(count.get(), 1);

        assert!(window.unsubscribe(id).unwrap());
        assert!(!window.unsubscribe(id).unwrap());
        window.on_scroll(&ABCDE, 300.0).unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn validate_against_detects_disorder() {
        let window = measured(&ABCDE, 100.0);
        window.on_viewport_resize(&ABCDE, 250.0).unwrap();

        assert_eq!(
            window.validate_against(&['C', 'B', 'A']).unwrap_err(),
            VirtualizeError::InvariantViolation(InvariantViolation::WindowOutOfOrder { index: 1 })
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err =
            VirtualWindow::<char>::new(WindowConfig::new().with_item_spacing(-2.0)).unwrap_err();
        assert_eq!(err, VirtualizeError::Argument(ArgumentError::InvalidExtent(-2.0)));
    }

    #[test]
    fn invalid_buffer_margin_is_rejected() {
        let config = WindowConfig::new()
            .with_buffer_margin(-5.0)
            .with_item_spacing(-2.0);
        assert_eq!(config.validate().unwrap_err().len(), 2);

        let err = VirtualWindow::<char>::new(config).unwrap_err();
        assert_eq!(err, VirtualizeError::Argument(ArgumentError::InvalidExtent(-5.0)));
    }

    #[test]
    fn mutation_inside_with_rendered_is_rejected() {
        let window = measured(&ABCDE, 100.0);
        window.on_viewport_resize(&ABCDE, 250.0).unwrap();

        let result = window.with_rendered(|items| {
            assert_eq!(items, &['A', 'B', 'C']);
            window.on_scroll(&ABCDE, 150.0)
        });

        assert_eq!(
            result.unwrap_err(),
            VirtualizeError::InvariantViolation(InvariantViolation::ReentrantMutation {
                operation: "on_scroll",
                active: "with_rendered",
            })
        );
        assert!(!window.is_mutating());
        assert_eq!(window.rendered(), vec!['A', 'B', 'C']);

        window.on_scroll(&ABCDE, 150.0).unwrap();
        assert_eq!(window.rendered(), vec!['B', 'C', 'D']);
    }
}
