mod common;

use std::time::Duration;

use common::*;
use pretty_assertions::assert_eq;
use sync_worker::mock::RecordingQueue;
use sync_worker::sync_processor::SyncProcessor;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_processor_drains_queue_until_shutdown() {
    let ctx = TestContext::new();
    ctx.queue.push(bike_upload("m1"));
    ctx.queue.push(remove_message("m2", "987"));

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(
        SyncProcessor::new(ctx.queue.clone(), ctx.pipeline.clone(), shutdown.clone()).start(),
    );

    tokio::time::timeout(Duration::from_secs(5), async {
        while ctx.queue.deleted().len() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("messages were not acknowledged in time");

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("processor did not stop")
        .unwrap();

    let mut deleted = ctx.queue.deleted();
    deleted.sort();
    assert_eq!(deleted, vec!["receipt-m1".to_string(), "receipt-m2".to_string()]);
}

#[tokio::test]
async fn test_processor_stops_on_idle_queue() {
    let ctx = TestContext::new();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(
        SyncProcessor::new(ctx.queue.clone(), ctx.pipeline.clone(), shutdown.clone()).start(),
    );

    tokio::time::sleep(Duration::from_millis(30)).await;
    shutdown.cancel();

    assert!(tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_processor_survives_failed_polls() {
    let ctx = TestContext::builder()
        .queue(RecordingQueue::new().with_failing_receives(2))
        .build();
    ctx.queue.push(bike_upload("m1"));

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(
        SyncProcessor::new(ctx.queue.clone(), ctx.pipeline.clone(), shutdown.clone()).start(),
    );

    tokio::time::timeout(Duration::from_secs(5), async {
        while ctx.queue.deleted().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("message was not acknowledged after the failed polls");

    assert!(ctx.queue.receive_calls() >= 3);
    assert_eq!(ctx.queue.deleted(), vec!["receipt-m1".to_string()]);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("processor did not stop")
        .unwrap();
}
