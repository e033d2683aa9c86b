//! # Core Logic - Shared Utilities for Testnet Tools
//!
//! This crate provides the chain-agnostic pieces used by the chain tools:
//! typed errors, logging, the activity log and run-state control.
//!
//! ## Modules
//!
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Log sink trait and run outcome types
//! - `utils` - Logger setup, run controller, cancellable delay, log book

// Module declarations - internal modules marked pub(crate)
pub mod error;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use error::{ConfigError, CoreError, NetworkError, TransactionError, WalletError};
pub use traits::{LogSink, RunOutcome, RunStats};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    cancellable_sleep, setup_logger, short_hash, LogBook, LogLine, Pause, RunController,
    RunGuard, RunState, ACTIVITY_TARGET,
};
