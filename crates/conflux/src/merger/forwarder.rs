use crate::CompletionGuard;
use core::pin::pin;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};

/// Forwarding task: drains one input stream onto the shared output,
/// preserving that stream's order, then signals the completion gate.
///
/// The forwarder never closes the output; that is the coordinator's job. If
/// the output receiver is gone the forwarder stops pulling and exits.
pub(crate) async fn forward_loop<S>(
    _stream_id: usize,
    input: S,
    out_tx: mpsc::Sender<S::Item>,
    guard: CompletionGuard,
) where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Forwarder {_stream_id} started");

    let mut input = pin!(input);
    while let Some(item) = input.next().await {
        if out_tx.send(item).await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Forwarder {_stream_id} exiting, merged stream dropped");
            break;
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Forwarder {_stream_id} drained");

    guard.complete();
}
