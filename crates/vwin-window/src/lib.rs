#![forbid(unsafe_code)]

//! Viewport-driven incremental windowing for vwin.
//!
//! A [`VirtualWindow`] keeps a small, ordered [`RenderedWindow`] of
//! materialized items in step with a much larger backing list. Scroll and
//! resize events run a [`Windower`] pass; backing list changes go through the
//! [`DiffApplier`]. Neither path rebuilds the window from scratch.

pub mod config;
pub mod diff;
pub mod estimator;
mod guard;
pub mod height_cache;
pub mod rendered;
pub mod viewport;
pub mod window;
pub mod windower;

pub use config::{ConfigError, WindowConfig, WindowConfigParse};
pub use diff::{DiffApplier, DiffOutcome};
pub use estimator::{Estimate, PositionEstimator, Spans};
pub use height_cache::HeightCache;
pub use rendered::{RenderedWindow, WindowChange};
pub use viewport::{Span, ViewportState};
pub use window::{ObserverId, VirtualWindow};
pub use windower::{PassStats, Windower};

pub use vwin_core::{
    ArgumentError, ChangeKind, InvariantViolation, ListChange, ObservableList, Result,
    VirtualizeError,
};
