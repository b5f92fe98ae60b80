use crate::CompletionGuard;
use core::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// Worker task: pulls jobs from the shared queue until it is closed and
/// drained, transforms each one, and pushes the result onto the shared
/// result stream.
///
/// Within one worker processing is FIFO; across workers the interleaving is
/// arbitrary, since all workers race on the same queue. The completion guard
/// is released on every exit path (including a panicking transform, via the
/// guard's drop), so the coordinator can always observe pool drain.
///
/// # Cancellation
///
/// When the token fires, the worker finishes its in-flight job, stops
/// pulling, and leaves any still-buffered jobs to be dropped with the queue.
pub(crate) async fn worker_loop<J, R, F, Fut>(
    _worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<J>>>,
    transform: Arc<F>,
    result_tx: mpsc::Sender<R>,
    cancel: CancellationToken,
    guard: CompletionGuard,
) where
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(J) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} started");

    loop {
        // Hold the queue lock only across the pull, never the transform.
        let job = {
            let mut queue = queue.lock().await;
            tokio::select! {
                () = cancel.cancelled() => None,
                job = queue.recv() => job,
            }
        };
        let Some(job) = job else { break };

        let result = transform(job).await;

        #[cfg(feature = "tracing")]
        tracing::debug!("Worker {_worker_id} processed job");

        if result_tx.send(result).await.is_err() {
            // The consumer dropped the result stream; nothing left to do.
            #[cfg(feature = "tracing")]
            tracing::debug!("Worker {_worker_id} exiting, result stream dropped");
            break;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {_worker_id} stopped");

    guard.complete();
}
