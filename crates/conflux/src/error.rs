//! Error types for the coordination library.
//!
//! This module defines the central `Error` enum covering every reportable
//! failure in the fan-out/fan-in plumbing. Transformation failures are out of
//! scope: the library treats `Job -> Result` as total, and a caller with
//! fallible work wraps its output in its own success/failure variant without
//! touching the plumbing.
//!
//! ## Error Cases
//! - `InvalidConfig`: Construction parameters were rejected (e.g. a pool size
//!   of zero).
//! - `Cancelled`: The cancellation token fired before or during the
//!   operation.
//! - `ChannelError`: Internal channel wiring failed (e.g. the worker pool
//!   exited while a submit was in flight).

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for dispatcher and merger operations.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Construction parameters were invalid.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The cancellation token fired; the operation returned early instead of
    /// suspending.
    #[error("Operation cancelled")]
    Cancelled,

    /// Internal channel send/receive failure (e.g., closed channel).
    #[error("Channel error: {context}")]
    ChannelError { context: String },
}
