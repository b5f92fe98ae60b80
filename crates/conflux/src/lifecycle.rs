//! Shared-output lifecycle state machine.
//!
//! A shared output stream moves through exactly three states: `Open` while
//! producers may still be attached, `Draining` once no further input will be
//! accepted but buffered work may still flow, and `Closed` after the single
//! closing authority has shut the stream. Transitions are compare-exchange
//! based, so racing producers can never close the same resource twice: only
//! one task wins each edge, and `Draining -> Closed` is performed exclusively
//! by the coordinator task that owns the close.

use core::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a shared output stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    /// Accepting new input; the output may still grow.
    Open = 0,
    /// No further input is accepted; buffered items still drain.
    Draining = 1,
    /// The output has been closed exactly once and will yield no more items.
    Closed = 2,
}

impl Lifecycle {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Open,
            1 => Self::Draining,
            _ => Self::Closed,
        }
    }
}

/// Atomic cell holding a [`Lifecycle`], advanced only by `try_transition`.
#[derive(Debug)]
pub struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    /// Creates a cell in the [`Lifecycle::Open`] state.
    pub const fn new() -> Self {
        Self(AtomicU8::new(Lifecycle::Open as u8))
    }

    /// Returns the current state.
    pub fn current(&self) -> Lifecycle {
        Lifecycle::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Attempts the `from -> to` transition, returning whether this caller
    /// won the edge. A lost race leaves the cell untouched.
    pub fn try_transition(&self, from: Lifecycle, to: Lifecycle) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for LifecycleCell {
    fn default() -> Self {
        Self::new()
    }
}
