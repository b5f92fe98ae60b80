use crate::config::CliArgs;
use anyhow::Result;
use conflux::{DispatcherConfig, StreamMerger, WorkDispatcher};
use core::time::Duration;
use rand::Rng;
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;

/// Worker pool scenario: every job is doubled by exactly one worker after a
/// jittered simulated work delay; the result stream is drained to its close.
pub async fn run_dispatch(args: &CliArgs) -> Result<()> {
    let work_ms = args.work_ms;
    let (dispatcher, mut results) = WorkDispatcher::spawn(
        DispatcherConfig::new(args.workers)
            .job_capacity(args.queue_capacity)
            .result_capacity(args.queue_capacity),
        CancellationToken::new(),
        move |job: u64| async move {
            let jitter = rand::rng().random_range(0..=work_ms / 2 + 1);
            tokio::time::sleep(Duration::from_millis(work_ms + jitter)).await;
            (job, job * 2)
        },
    )?;

    // Submit concurrently with the drain below so a job count larger than
    // the bounded queues cannot wedge the scenario.
    let jobs = args.jobs;
    let submitter = tokio::spawn(async move {
        for job in 1..=jobs {
            dispatcher.submit(job).await?;
        }
        dispatcher.close();
        Ok::<(), conflux::Error>(())
    });

    // Which worker handled each job is logged by the library at debug level
    // (enabled by the default `conflux=debug` filter); results themselves
    // carry no worker identity.
    let mut processed = 0u64;
    while let Some((job, result)) = results.next().await {
        processed += 1;
        tracing::info!(job, result, "job processed");
    }
    tracing::info!(processed, "result stream closed");
    submitter.await??;

    Ok(())
}

/// Stream merge scenario: independent producers each emit `id * 10 + i`, and
/// the single merged stream is drained until every producer has closed.
pub async fn run_merge(args: &CliArgs) -> Result<()> {
    let mut producers = Vec::new();
    for id in 1..=args.producers {
        let items = args.items_per_producer;
        let (tx, rx) = mpsc::channel(2);
        tokio::spawn(async move {
            for i in 0..items {
                if tx.send(id * 10 + i).await.is_err() {
                    break;
                }
            }
        });
        producers.push(ReceiverStream::new(rx));
    }

    let mut merged = StreamMerger::new().merge(producers);

    let mut delivered = 0u64;
    while let Some(item) = merged.next().await {
        delivered += 1;
        tracing::info!(item, "merged item");
    }
    tracing::info!(delivered, "merged stream closed");

    Ok(())
}
