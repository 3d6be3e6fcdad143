//! Full-snapshot subscriptions.
//!
//! Every delivery carries the complete current state of the watched record
//! (or ordered collection); the consumer discards the previous snapshot
//! entirely. A watch on a non-existent record delivers exactly one missing
//! marker and then nothing until the record is created.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::{Collection, Direction};

/// One delivery from a single-record watch.
#[derive(Debug, Clone, PartialEq)]
pub enum DocEvent {
    /// The record's complete current state.
    Exists(Value),
    /// The record does not exist, distinguishable from an empty snapshot
    /// so consumers can show a not-found state.
    Missing,
}

/// Idempotent unsubscribe handle. Cancelling stops further deliveries
/// immediately; calling it again is a no-op.
#[derive(Clone)]
pub struct CancelHandle {
    id: Uuid,
    cancelled: Arc<AtomicBool>,
    abort: AbortHandle,
}

impl CancelHandle {
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.abort.abort();
            debug!(subscription = %self.id, "subscription cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A standing watch delivering full snapshots. Explicit cancellation (via
/// [`Subscription::cancel`] or a cloned [`CancelHandle`]) is the only
/// release mechanism while the subscription is live; dropping it cancels
/// too so a forgotten watch cannot leak its task.
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
    handle: CancelHandle,
}

impl<T> Subscription<T> {
    fn new(rx: mpsc::UnboundedReceiver<T>, abort: AbortHandle) -> Self {
        Self {
            rx,
            handle: CancelHandle {
                id: Uuid::new_v4(),
                cancelled: Arc::new(AtomicBool::new(false)),
                abort,
            },
        }
    }

    /// Identifier for logging and bookkeeping.
    pub fn id(&self) -> Uuid {
        self.handle.id
    }

    /// Next snapshot, or `None` once the watch is cancelled. Snapshots
    /// queued before cancellation are discarded, not delivered.
    pub async fn recv(&mut self) -> Option<T> {
        if self.handle.is_cancelled() {
            return None;
        }
        match self.rx.recv().await {
            Some(item) if !self.handle.is_cancelled() => Some(item),
            _ => None,
        }
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// A cheap handle that can cancel this watch from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

pub(crate) fn spawn_doc_watch(collection: Collection, key: String) -> Subscription<DocEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    // Register for changes before the initial read so no mutation can slip
    // between snapshot and stream.
    let mut changes = collection.inner.changes.subscribe();

    let task = tokio::spawn(async move {
        let initial = match collection.read(&key).await {
            Ok(document) => document,
            Err(e) => {
                warn!(key = %key, error = %e, "initial snapshot read failed");
                return;
            }
        };
        let mut missing = initial.is_none();
        if tx.send(doc_event(initial)).is_err() {
            return;
        }

        loop {
            match changes.recv().await {
                Ok(event) if event.collection == collection.name && event.key == key => {
                    match collection.read(&key).await {
                        Ok(document) => {
                            // A still-missing record is not re-announced.
                            if document.is_none() && missing {
                                continue;
                            }
                            missing = document.is_none();
                            if tx.send(doc_event(document)).is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!(key = %key, error = %e, "snapshot read failed"),
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    // Full-snapshot semantics make lag harmless: one resync
                    // replaces everything that was skipped.
                    warn!(key = %key, skipped, "change stream lagged, resyncing");
                    if let Ok(document) = collection.read(&key).await {
                        if document.is_none() && missing {
                            continue;
                        }
                        missing = document.is_none();
                        if tx.send(doc_event(document)).is_err() {
                            return;
                        }
                    }
                }
                Err(RecvError::Closed) => return,
            }
        }
    });

    Subscription::new(rx, task.abort_handle())
}

pub(crate) fn spawn_query_watch(
    collection: Collection,
    sort_field: String,
    direction: Direction,
) -> Subscription<Vec<Value>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut changes = collection.inner.changes.subscribe();

    let task = tokio::spawn(async move {
        match collection.query_ordered(&sort_field, direction).await {
            Ok(documents) => {
                if tx.send(documents).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(collection = %collection.name, error = %e, "initial query failed");
                return;
            }
        }

        loop {
            match changes.recv().await {
                Ok(event) if event.collection == collection.name => {
                    match collection.query_ordered(&sort_field, direction).await {
                        Ok(documents) => {
                            if tx.send(documents).is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(collection = %collection.name, error = %e, "query snapshot failed");
                        }
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(collection = %collection.name, skipped, "change stream lagged, resyncing");
                    if let Ok(documents) = collection.query_ordered(&sort_field, direction).await {
                        if tx.send(documents).is_err() {
                            return;
                        }
                    }
                }
                Err(RecvError::Closed) => return,
            }
        }
    });

    Subscription::new(rx, task.abort_handle())
}

fn doc_event(document: Option<Value>) -> DocEvent {
    match document {
        Some(document) => DocEvent::Exists(document),
        None => DocEvent::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn initial_snapshot_arrives_immediately() {
        let store = DocumentStore::new();
        let records = store.collection("records");
        records.write("a", json!({ "v": 1 })).await.unwrap();

        let mut watch = records.subscribe_doc("a");
        assert_eq!(
            watch.recv().await.unwrap(),
            DocEvent::Exists(json!({ "v": 1 }))
        );
    }

    #[tokio::test]
    async fn missing_record_delivers_one_not_found_until_created() {
        let store = DocumentStore::new();
        let records = store.collection("records");

        let mut watch = records.subscribe_doc("ghost");
        assert_eq!(watch.recv().await.unwrap(), DocEvent::Missing);

        // Unrelated writes do not wake the watch.
        records.write("other", json!({})).await.unwrap();

        records.write("ghost", json!({ "v": 1 })).await.unwrap();
        assert_eq!(
            watch.recv().await.unwrap(),
            DocEvent::Exists(json!({ "v": 1 }))
        );
    }

    #[tokio::test]
    async fn self_caused_changes_are_delivered() {
        let store = DocumentStore::new();
        let records = store.collection("records");
        records.write("a", json!({ "v": 1 })).await.unwrap();

        let mut watch = records.subscribe_doc("a");
        watch.recv().await.unwrap();

        records.write("a", json!({ "v": 2 })).await.unwrap();
        assert_eq!(
            watch.recv().await.unwrap(),
            DocEvent::Exists(json!({ "v": 2 }))
        );
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_stops_deliveries() {
        let store = DocumentStore::new();
        let records = store.collection("records");
        records.write("a", json!({ "v": 1 })).await.unwrap();

        let mut watch = records.subscribe_doc("a");
        watch.cancel();
        watch.cancel();
        assert!(watch.is_cancelled());
        assert!(watch.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancel_handle_cancels_from_elsewhere() {
        let store = DocumentStore::new();
        let records = store.collection("records");

        let mut watch = records.subscribe_doc("a");
        let handle = watch.cancel_handle();
        handle.cancel();
        handle.cancel();
        assert!(watch.recv().await.is_none());
    }

    #[tokio::test]
    async fn query_watch_re_delivers_ordered_snapshots() {
        let store = DocumentStore::new();
        let records = store.collection("records");
        records
            .write("a", json!({ "timestamp": "2026-01-01T00:00:00Z" }))
            .await
            .unwrap();

        let mut watch = records.subscribe_query("timestamp", Direction::Descending);
        assert_eq!(watch.recv().await.unwrap().len(), 1);

        records
            .write("b", json!({ "timestamp": "2026-02-01T00:00:00Z" }))
            .await
            .unwrap();
        let snapshot = watch.recv().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0]["timestamp"], "2026-02-01T00:00:00Z");
    }
}
