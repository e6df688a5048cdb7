#![forbid(unsafe_code)]

//! Core: backing list adapter, change events, errors, and logging facade for
//! the vwin windowing engine.

pub mod change;
pub mod error;
pub mod list;
pub mod logging;

pub use change::{ChangeKind, ListChange};
pub use error::{ArgumentError, InvariantViolation, Result, VirtualizeError};
pub use list::{ObservableList, SubscriptionId};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, trace_span, warn};
