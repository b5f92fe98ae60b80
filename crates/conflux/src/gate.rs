//! Join barrier for "all producers done" signaling.
//!
//! [`CompletionGate`] replaces the raw shared counter that fan-out/fan-in
//! code tends to grow: `new(parties)` hands out `parties` owned
//! [`CompletionGuard`]s, each signaling completion exactly once, and a single
//! observer awaits [`CompletionGate::joined`]. The final decrement is the
//! only one that publishes, so the observer wakes exactly once and only after
//! every party has signaled.
//!
//! Guards also signal on drop. A worker that panics or exits early still
//! releases its slot, so the downstream close cannot stall on a lost guard.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug)]
struct GateInner {
    remaining: AtomicUsize,
    joined_tx: watch::Sender<bool>,
}

/// Observer half of the barrier. Awaiting [`joined`](Self::joined) suspends
/// until every [`CompletionGuard`] has signaled.
#[derive(Debug)]
pub struct CompletionGate {
    joined_rx: watch::Receiver<bool>,
}

/// One party's completion handle. Signals exactly once, either explicitly via
/// [`complete`](Self::complete) or implicitly when dropped.
#[derive(Debug)]
pub struct CompletionGuard {
    inner: Arc<GateInner>,
    signalled: bool,
}

impl CompletionGate {
    /// Creates a barrier for `parties` concurrent tasks, returning the
    /// observer and one guard per party.
    ///
    /// Zero parties is the trivial case: the gate is already joined.
    pub fn new(parties: usize) -> (Self, Vec<CompletionGuard>) {
        let (joined_tx, joined_rx) = watch::channel(parties == 0);
        let inner = Arc::new(GateInner {
            remaining: AtomicUsize::new(parties),
            joined_tx,
        });

        let guards = (0..parties)
            .map(|_| CompletionGuard {
                inner: Arc::clone(&inner),
                signalled: false,
            })
            .collect();

        (Self { joined_rx }, guards)
    }

    /// Suspends until all parties have signaled completion.
    pub async fn joined(mut self) {
        // The last guard publishes `true` before releasing its Arc, so the
        // current value is observed even if every guard is already gone.
        let _ = self.joined_rx.wait_for(|joined| *joined).await;
    }
}

impl CompletionGuard {
    /// Signals completion for this party.
    pub fn complete(mut self) {
        self.signal();
    }

    fn signal(&mut self) {
        if self.signalled {
            return;
        }
        self.signalled = true;

        // Decrement-and-test: only the final party publishes the join.
        if self.inner.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _ = self.inner.joined_tx.send(true);
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.signal();
    }
}
