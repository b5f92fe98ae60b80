//! Fan-out: a bounded job queue drained by a fixed pool of worker tasks.
//!
//! [`WorkDispatcher::spawn`] starts exactly N workers at construction. Each
//! worker races the others on one shared bounded queue, applies the
//! caller-supplied transform, and pushes the result onto a shared bounded
//! result stream. Every job is processed by exactly one worker; no ordering
//! is guaranteed across workers.
//!
//! ## Shutdown
//!
//! Closing the shared result stream more than once, or while a worker might
//! still push, would be fatal, so the close has a single authority: workers
//! signal a [`CompletionGate`] as they exit, and one coordinator task awaits
//! the gate and drops the sole retained result sender. Worker sender clones
//! alone can never close the stream early. [`Lifecycle::Closed`] is recorded
//! by the stream itself once the final buffered result has been delivered.

mod worker;

use crate::{
    CompletionGate, DispatcherConfig, Error, Lifecycle, LifecycleCell, Result,
    config::bounded_capacity,
};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;
use worker::worker_loop;

pin_project_lite::pin_project! {
    /// The shared result stream of a worker pool.
    ///
    /// Yields each submitted job's result exactly once, in arbitrary order
    /// across workers, and ends only after the pool has fully drained and the
    /// coordinator has performed the single close.
    #[derive(Debug)]
    pub struct ResultStream<R> {
        #[pin]
        inner: ReceiverStream<R>,
        state: Arc<LifecycleCell>,
    }
}

impl<R> ResultStream<R> {
    /// Current lifecycle: `Open` while jobs may still be submitted,
    /// `Draining` once the pool will receive no more, `Closed` once the
    /// final buffered result has been delivered.
    pub fn state(&self) -> Lifecycle {
        self.state.current()
    }

    /// Whether the pool has drained and every buffered result was delivered.
    pub fn is_closed(&self) -> bool {
        self.state() == Lifecycle::Closed
    }
}

impl<R> Stream for ResultStream<R> {
    type Item = R;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<R>> {
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

/// Handle for feeding jobs into a fixed-size worker pool.
///
/// Owning the handle is the permission to submit: [`close`](Self::close)
/// consumes it, so submitting after close is a compile error rather than a
/// runtime surprise.
#[derive(Debug)]
pub struct WorkDispatcher<J> {
    job_tx: mpsc::Sender<J>,
    state: Arc<LifecycleCell>,
    cancel: CancellationToken,
}

impl<J> WorkDispatcher<J>
where
    J: Send + 'static,
{
    /// Starts a worker pool and returns the submission handle together with
    /// the shared result stream.
    ///
    /// Exactly `config.workers` worker tasks are spawned up front, each
    /// looping pull -> transform -> push until the job queue is closed and
    /// drained. `transform` is applied to every job by exactly one worker; a
    /// pure function is wrapped as `|job| async move { f(job) }`.
    ///
    /// Cancelling `cancel` makes pending and future submits return
    /// [`Error::Cancelled`]; workers finish their in-flight job, discard
    /// anything still buffered, and the result stream closes as usual.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config.workers` is zero.
    pub fn spawn<R, F, Fut>(
        config: DispatcherConfig,
        cancel: CancellationToken,
        transform: F,
    ) -> Result<(Self, ResultStream<R>)>
    where
        R: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        config.validate()?;

        let (job_tx, job_rx) = mpsc::channel(bounded_capacity(config.job_capacity));
        let (result_tx, result_rx) = mpsc::channel(bounded_capacity(config.result_capacity));

        // One shared queue that all workers race on. The async mutex is held
        // only across the pull itself, never across a transform.
        let queue = Arc::new(Mutex::new(job_rx));
        let transform = Arc::new(transform);
        let state = Arc::new(LifecycleCell::new());

        let (gate, guards) = CompletionGate::new(config.workers);
        for (worker_id, guard) in guards.into_iter().enumerate() {
            tokio::spawn(worker_loop(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&transform),
                result_tx.clone(),
                cancel.clone(),
                guard,
            ));
        }

        // Coordinator: the single close authority for the result stream. It
        // holds the one retained sender, so the stream stays open until every
        // worker has signaled the gate and this task drops it. The Closed
        // state is recorded only once the consumer has drained the buffer.
        let coordinator_state = Arc::clone(&state);
        tokio::spawn(async move {
            gate.joined().await;
            // On the cancel path the handle may never see `close()`, so take
            // the Open -> Draining edge here if it is still pending.
            coordinator_state.try_transition(Lifecycle::Open, Lifecycle::Draining);
            drop(result_tx);
            #[cfg(feature = "tracing")]
            tracing::debug!("worker pool drained, result stream draining");
        });

        let dispatcher = Self {
            job_tx,
            state: Arc::clone(&state),
            cancel,
        };
        let results = ResultStream {
            inner: ReceiverStream::new(result_rx),
            state,
        };
        Ok((dispatcher, results))
    }

    /// Enqueues a job onto the bounded job queue.
    ///
    /// Suspends while the queue is at capacity; a full queue is backpressure,
    /// never an error. Returns once a worker slot has accepted the job.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if the cancellation token has fired.
    /// - [`Error::ChannelError`] if the worker pool exited while the submit
    ///   was in flight.
    pub async fn submit(&self, job: J) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tokio::select! {
            () = self.cancel.cancelled() => Err(Error::Cancelled),
            sent = self.job_tx.send(job) => sent.map_err(|_| Error::ChannelError {
                context: "job queue closed before the submit completed".into(),
            }),
        }
    }

    /// Signals that no further jobs will be submitted.
    ///
    /// Already-queued jobs still drain; once the last worker finishes, the
    /// result stream closes. Consuming `self` makes a subsequent submit
    /// unrepresentable.
    pub fn close(self) {
        self.state
            .try_transition(Lifecycle::Open, Lifecycle::Draining);
        #[cfg(feature = "tracing")]
        tracing::debug!("job queue closed");
        // `job_tx` drops here; workers observe the closed queue after the
        // drain and exit.
    }

    /// Current lifecycle of the shared result stream.
    pub fn state(&self) -> Lifecycle {
        self.state.current()
    }

    /// The cancellation token this pool observes.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}
