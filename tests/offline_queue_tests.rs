// Offline behavior: no remote traffic without connectivity, dedup on
// enqueue, and a single flush when connectivity returns.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{build_orchestrator, seed_segment, MockClient, MockLocal};
use segscribe::{MemoryStore, OfflineQueue, SegmentStore, TranscriptionStatus};
use tokio::sync::watch;

#[tokio::test]
async fn offline_submit_queues_without_touching_remote() {
    let store = Arc::new(MemoryStore::new());
    let client = Arc::new(MockClient::succeeding("never used"));
    let local = Arc::new(MockLocal::failing());
    let (orchestrator, queue) =
        build_orchestrator(store.clone(), client.clone(), local, 5, false);

    let segment = seed_segment(&store, 0, 30.0).await;
    orchestrator.transcribe(segment.clone()).await;

    assert_eq!(client.upload_count(), 0);
    assert_eq!(queue.len().await, 1);

    // A pending record exists so the segment is recoverable after restart.
    let t = store.transcription_for(segment.id).await.unwrap().unwrap();
    assert_eq!(t.status, TranscriptionStatus::Pending);
}

#[tokio::test]
async fn enqueueing_the_same_segment_twice_is_a_no_op() {
    let store = Arc::new(MemoryStore::new());
    let (orchestrator, queue) = build_orchestrator(
        store.clone(),
        Arc::new(MockClient::failing()),
        Arc::new(MockLocal::failing()),
        5,
        false,
    );

    let segment = seed_segment(&store, 0, 30.0).await;
    orchestrator.transcribe(segment.clone()).await;
    orchestrator.transcribe(segment.clone()).await;

    assert_eq!(queue.len().await, 1);
}

#[tokio::test]
async fn connectivity_flip_flushes_each_queued_segment_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let client = Arc::new(MockClient::succeeding("flushed"));
    let local = Arc::new(MockLocal::failing());
    let (orchestrator, queue) =
        build_orchestrator(store.clone(), client.clone(), local, 5, false);
    orchestrator.attach_queue_consumer().await;

    let a = seed_segment(&store, 0, 30.0).await;
    let b = seed_segment(&store, 30, 30.0).await;
    orchestrator.transcribe(a.clone()).await;
    orchestrator.transcribe(b.clone()).await;
    assert_eq!(queue.len().await, 2);

    queue.set_connected(true).await;

    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if client.upload_count() >= 2 {
            break;
        }
    }

    assert!(queue.is_empty().await);
    assert_eq!(client.upload_count(), 2);
    for id in [a.id, b.id] {
        let t = store.transcription_for(id).await.unwrap().unwrap();
        assert_eq!(t.status, TranscriptionStatus::Completed);
        assert_eq!(t.text, "flushed");
    }

    // A repeat transition must not resubmit anything.
    queue.set_connected(false).await;
    queue.set_connected(true).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.upload_count(), 2);
}

#[tokio::test]
async fn segments_stay_queued_until_a_consumer_is_registered() {
    let store = Arc::new(MemoryStore::new());
    let client = Arc::new(MockClient::succeeding("late"));
    let local = Arc::new(MockLocal::failing());
    let (orchestrator, queue) =
        build_orchestrator(store.clone(), client.clone(), local, 5, false);

    let segment = seed_segment(&store, 0, 30.0).await;
    orchestrator.transcribe(segment.clone()).await;

    // Connectivity alone is not enough.
    queue.set_connected(true).await;
    assert_eq!(queue.len().await, 1);

    // Registering the consumer while connected flushes immediately.
    orchestrator.attach_queue_consumer().await;

    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if queue.is_empty().await {
            break;
        }
    }
    assert!(queue.is_empty().await);
    assert_eq!(client.upload_count(), 1);
}

#[tokio::test]
async fn connectivity_watch_stream_drives_the_queue() {
    let queue = Arc::new(OfflineQueue::new(false));
    let (tx, rx) = watch::channel(false);
    let handle = queue.watch_connectivity(rx);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!queue.is_connected().await);

    tx.send(true).unwrap();
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if queue.is_connected().await {
            break;
        }
    }
    assert!(queue.is_connected().await);

    drop(tx);
    handle.await.unwrap();
}
