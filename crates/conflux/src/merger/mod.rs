//! Fan-in: merge a fixed set of independent streams into one output.
//!
//! [`StreamMerger::merge`] spawns one forwarding task per input stream. Each
//! forwarder copies its stream's items onto the shared output in order, so
//! per-stream order is preserved while cross-stream interleaving is
//! unconstrained (it depends only on relative producer speed). No item is
//! dropped and none is delivered twice.
//!
//! ## Termination protocol
//!
//! The merged stream must close exactly once, and only after every input has
//! closed and drained. Forwarders therefore never close the output
//! themselves: each signals a [`CompletionGate`] when its input ends, and a
//! single coordinator task awaits the gate before dropping the one retained
//! output sender. An input that never closes stalls the merged close
//! indefinitely; that liveness hazard is the caller's to bound with an
//! external timeout, never papered over with a hidden one here.
//!
//! The lifecycle is observable through [`MergedStream::state`]: `Draining`
//! once every input has closed, `Closed` once the final buffered item has
//! also been delivered.

mod forwarder;
#[cfg(test)]
mod tests;

use crate::{CompletionGate, Lifecycle, LifecycleCell, MergerConfig, config::bounded_capacity};
use core::pin::Pin;
use core::task::{Context, Poll};
use forwarder::forward_loop;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};

pin_project_lite::pin_project! {
    /// The single consolidated output of a [`StreamMerger::merge`] call.
    ///
    /// Yields every item from every input exactly once and ends only after
    /// all inputs have closed and all buffered items were delivered.
    #[derive(Debug)]
    pub struct MergedStream<T> {
        #[pin]
        inner: ReceiverStream<T>,
        state: Arc<LifecycleCell>,
    }
}

impl<T> MergedStream<T> {
    /// Current lifecycle: `Open` while at least one input may still produce,
    /// `Draining` once every input has closed, `Closed` once the final
    /// buffered item has been delivered.
    pub fn state(&self) -> Lifecycle {
        self.state.current()
    }

    /// Whether every input has closed and every buffered item was delivered.
    pub fn is_closed(&self) -> bool {
        self.state() == Lifecycle::Closed
    }
}

impl<T> Stream for MergedStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.project();
        let next = this.inner.poll_next(cx);
        if let Poll::Ready(None) = next {
            // The stream is the only observer of the last delivery, so it
            // owns the final transition.
            this.state
                .try_transition(Lifecycle::Draining, Lifecycle::Closed);
        }
        next
    }
}

/// Consolidates independent input streams into one [`MergedStream`].
#[derive(Clone, Debug, Default)]
pub struct StreamMerger {
    config: MergerConfig,
}

impl StreamMerger {
    /// Creates a merger with the default output capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a merger with an explicit [`MergerConfig`].
    pub fn with_config(config: MergerConfig) -> Self {
        Self { config }
    }

    /// Merges a fixed set of input streams into one output stream.
    ///
    /// The input set is fixed at call time; there is no dynamic registration
    /// afterwards. Zero inputs is the trivial case: the returned stream is
    /// already closed.
    ///
    /// Dropping the [`MergedStream`] mid-merge makes the forwarders stop and
    /// exit cleanly; remaining input items are simply not pulled.
    pub fn merge<S>(&self, inputs: impl IntoIterator<Item = S>) -> MergedStream<S::Item>
    where
        S: Stream + Send + 'static,
        S::Item: Send + 'static,
    {
        let (out_tx, out_rx) = mpsc::channel(bounded_capacity(self.config.output_capacity));
        let state = Arc::new(LifecycleCell::new());

        let inputs: Vec<S> = inputs.into_iter().collect();
        let (gate, guards) = CompletionGate::new(inputs.len());

        #[cfg(feature = "tracing")]
        tracing::debug!("merging {} input streams", inputs.len());

        for (stream_id, (input, guard)) in inputs.into_iter().zip(guards).enumerate() {
            tokio::spawn(forward_loop(stream_id, input, out_tx.clone(), guard));
        }

        // Coordinator: sole authority for ending the output. With zero
        // inputs the gate is already joined and the stream closes
        // immediately. Dropping the retained sender stops the stream; the
        // Closed state is recorded only once the consumer has also drained
        // the buffer.
        let coordinator_state = Arc::clone(&state);
        tokio::spawn(async move {
            gate.joined().await;
            coordinator_state.try_transition(Lifecycle::Open, Lifecycle::Draining);
            drop(out_tx);
            #[cfg(feature = "tracing")]
            tracing::debug!("all inputs drained, merged stream draining");
        });

        MergedStream {
            inner: ReceiverStream::new(out_rx),
            state,
        }
    }
}
