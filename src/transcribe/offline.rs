use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::Segment;

/// Callback a flushed segment is handed to. Implementations are expected to
/// spawn their own work and return immediately.
pub type QueueConsumer = Arc<dyn Fn(Segment) + Send + Sync>;

/// Holding area for segments that cannot be submitted without connectivity.
///
/// All mutation (enqueue, connectivity update, flush) is serialized behind a
/// single mutex: a flush drains the queue while enqueues may race with it.
/// An `unavailable → available` transition flushes every queued segment to
/// the registered consumer exactly once; with no consumer registered the
/// segments stay queued until one is set.
pub struct OfflineQueue {
    inner: Mutex<Inner>,
}

struct Inner {
    connected: bool,
    queue: Vec<Segment>,
    consumer: Option<QueueConsumer>,
}

impl OfflineQueue {
    pub fn new(initially_connected: bool) -> Self {
        Self {
            inner: Mutex::new(Inner {
                connected: initially_connected,
                queue: Vec::new(),
                consumer: None,
            }),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.connected
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.queue.is_empty()
    }

    pub async fn queued_ids(&self) -> Vec<Uuid> {
        self.inner.lock().await.queue.iter().map(|s| s.id).collect()
    }

    /// Register the consumer; flushes immediately if already connected.
    pub async fn set_consumer(&self, consumer: QueueConsumer) {
        let mut inner = self.inner.lock().await;
        inner.consumer = Some(consumer);
        if inner.connected {
            Self::flush_locked(&mut inner);
        }
    }

    /// Queue a segment for later submission. Enqueueing a segment that is
    /// already queued is a no-op.
    pub async fn enqueue(&self, segment: Segment) {
        let mut inner = self.inner.lock().await;
        if inner.queue.iter().any(|s| s.id == segment.id) {
            debug!("Segment {} already queued", segment.id);
            return;
        }
        info!("Queued segment {} for offline transcription", segment.id);
        inner.queue.push(segment);
    }

    /// Apply a connectivity change. Only the `false → true` edge triggers a
    /// flush; going offline never re-queues in-flight work.
    pub async fn set_connected(&self, connected: bool) {
        let mut inner = self.inner.lock().await;
        let was_connected = inner.connected;
        inner.connected = connected;
        if connected && !was_connected {
            Self::flush_locked(&mut inner);
        }
    }

    /// Follow a connectivity signal stream.
    pub fn watch_connectivity(self: &Arc<Self>, mut rx: watch::Receiver<bool>) -> JoinHandle<()> {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let connected = *rx.borrow_and_update();
                queue.set_connected(connected).await;
                if rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    fn flush_locked(inner: &mut Inner) {
        let Some(consumer) = inner.consumer.clone() else {
            return;
        };
        if inner.queue.is_empty() {
            return;
        }

        let drained: Vec<Segment> = inner.queue.drain(..).collect();
        info!("Connectivity restored; flushing {} queued segments", drained.len());
        for segment in drained {
            consumer(segment);
        }
    }
}
