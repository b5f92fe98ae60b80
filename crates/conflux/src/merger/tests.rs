use crate::{DispatcherConfig, Lifecycle, MergerConfig, StreamMerger, WorkDispatcher};
use core::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::{StreamExt, wrappers::ReceiverStream};
use tokio_util::sync::CancellationToken;

/// Spawns a producer task emitting `items` with a small delay between sends,
/// returning the receiving stream.
fn spawn_producer(items: Vec<u64>, delay: Duration) -> ReceiverStream<u64> {
    let (tx, rx) = mpsc::channel(2);
    tokio::spawn(async move {
        for item in items {
            if tx.send(item).await.is_err() {
                break;
            }
            tokio::time::sleep(delay).await;
        }
    });
    ReceiverStream::new(rx)
}

#[tokio::test]
async fn two_producers_merge_without_loss() {
    let left = spawn_producer((10..=14).collect(), Duration::from_millis(1));
    let right = spawn_producer((20..=24).collect(), Duration::from_millis(1));

    let mut merged = StreamMerger::new().merge(vec![left, right]);

    let mut out = Vec::new();
    while let Some(item) = merged.next().await {
        out.push(item);
    }

    // Close arrives strictly after the tenth item.
    assert_eq!(out.len(), 10);
    assert_eq!(merged.next().await, None);

    out.sort_unstable();
    assert_eq!(out, vec![10, 11, 12, 13, 14, 20, 21, 22, 23, 24]);
}

#[tokio::test]
async fn merge_is_complete_across_many_streams() {
    let inputs: Vec<_> = (0..5u64)
        .map(|id| {
            let items: Vec<u64> = (0..=id).map(|i| id * 100 + i).collect();
            tokio_stream::iter(items)
        })
        .collect();

    let expected: Vec<u64> = (0..5u64)
        .flat_map(|id| (0..=id).map(move |i| id * 100 + i))
        .collect();

    let merged = StreamMerger::new().merge(inputs);
    let mut out: Vec<u64> = merged.collect().await;
    out.sort_unstable();

    let mut expected = expected;
    expected.sort_unstable();
    assert_eq!(out, expected);
}

#[tokio::test]
async fn per_stream_order_is_preserved() {
    let streams: Vec<_> = (0..3u64)
        .map(|id| {
            let items: Vec<(u64, u64)> = (0..20).map(|seq| (id, seq)).collect();
            spawn_producer_tagged(items)
        })
        .collect();

    let merged = StreamMerger::with_config(MergerConfig { output_capacity: 1 }).merge(streams);
    let out: Vec<(u64, u64)> = merged.collect().await;
    assert_eq!(out.len(), 60);

    for id in 0..3 {
        let seqs: Vec<u64> = out
            .iter()
            .filter(|(stream, _)| *stream == id)
            .map(|(_, seq)| *seq)
            .collect();
        assert_eq!(seqs, (0..20).collect::<Vec<u64>>());
    }
}

fn spawn_producer_tagged(items: Vec<(u64, u64)>) -> ReceiverStream<(u64, u64)> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        for item in items {
            if tx.send(item).await.is_err() {
                break;
            }
        }
    });
    ReceiverStream::new(rx)
}

#[tokio::test]
async fn finite_inputs_terminate_the_merge() {
    let inputs: Vec<_> = (0..4u64)
        .map(|id| spawn_producer(vec![id], Duration::from_millis(1)))
        .collect();

    let merged = StreamMerger::new().merge(inputs);
    let drained = tokio::time::timeout(Duration::from_secs(1), merged.collect::<Vec<u64>>()).await;
    assert_eq!(drained.unwrap().len(), 4);
}

#[tokio::test]
async fn zero_inputs_is_immediately_closed() {
    let mut merged = StreamMerger::new().merge(Vec::<ReceiverStream<u64>>::new());
    let next = tokio::time::timeout(Duration::from_secs(1), merged.next()).await;
    assert_eq!(next.unwrap(), None);
    assert_eq!(merged.state(), Lifecycle::Closed);
}

#[tokio::test]
async fn an_open_input_holds_the_merged_stream_open() {
    let (held_tx, held_rx) = mpsc::channel::<u64>(1);

    let mut merged = StreamMerger::new().merge(vec![
        ReceiverStream::new(held_rx),
        spawn_producer(vec![2], Duration::from_millis(1)),
    ]);

    assert_eq!(merged.next().await, Some(2));

    // One input never closed, so the merged stream must not close either: a
    // poll observes Pending, and the lifecycle never reaches Closed.
    let stalled = futures::future::poll_immediate(merged.next()).await;
    assert!(
        stalled.is_none(),
        "merged stream closed with an input open"
    );
    assert!(!merged.is_closed());

    // Closing the held input lets the merge terminate; only the drained
    // stream records Closed.
    drop(held_tx);
    assert_eq!(merged.next().await, None);
    assert_eq!(merged.state(), Lifecycle::Closed);
}

#[tokio::test]
async fn dispatcher_results_compose_into_a_merge() {
    let mut result_streams = Vec::new();
    for base in [0u64, 100] {
        let (dispatcher, results) = WorkDispatcher::spawn(
            DispatcherConfig::new(2),
            CancellationToken::new(),
            move |job: u64| async move { base + job * 2 },
        )
        .unwrap();

        tokio::spawn(async move {
            for job in 1..=5 {
                dispatcher.submit(job).await.unwrap();
            }
            dispatcher.close();
        });

        result_streams.push(results);
    }

    let merged = StreamMerger::new().merge(result_streams);
    let mut out: Vec<u64> = merged.collect().await;
    out.sort_unstable();
    assert_eq!(out, vec![2, 4, 6, 8, 10, 102, 104, 106, 108, 110]);
}
