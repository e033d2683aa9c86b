//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

// Internal modules - not part of public API
pub(crate) mod delay;
pub(crate) mod format;
pub(crate) mod log_book;
pub(crate) mod logger;
pub(crate) mod runner;

// Selective exports - only public utilities
pub use delay::{cancellable_sleep, Pause};
pub use format::short_hash;
pub use log_book::{LogBook, LogLine};
pub use logger::{setup_logger, ACTIVITY_TARGET};
pub use runner::{RunController, RunGuard, RunState};
