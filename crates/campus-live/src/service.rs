//! The live sequencer: one lock around the update store and the hub.

use campus_types::{AnnouncementRecord, LiveFrame};
use tokio::sync::{mpsc, Mutex};

use crate::error::LiveError;
use crate::hub::{BroadcastHub, ConnectionId, ObserverConnection};
use crate::store::UpdateStore;

/// Default capacity of each observer's outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// State guarded by the sequencer lock.
///
/// Every append-then-push and every register-with-snapshot runs while this
/// lock is held, and none of them awaits I/O inside it.
#[derive(Debug)]
pub(crate) struct Sequencer {
    pub(crate) store: UpdateStore,
    pub(crate) hub: BroadcastHub,
}

/// An observer's handle on the live channel.
///
/// `frames` yields serialized [`LiveFrame`]s: the snapshot first, then
/// increments in publish order. Dropping the receiver closes the
/// connection; the hub prunes it on its next push.
#[derive(Debug)]
pub struct Subscription {
    /// Hub-internal id, for [`LiveService::unsubscribe`].
    pub id: ConnectionId,
    /// Serialized frames queued for this observer.
    pub frames: mpsc::Receiver<String>,
}

/// The real-time announcement service.
///
/// Constructed once at startup and shared by reference (usually through
/// an `Arc` in the server state). Independent instances do not share any
/// state, which keeps tests isolated.
#[derive(Debug)]
pub struct LiveService {
    pub(crate) sequencer: Mutex<Sequencer>,
    queue_capacity: usize,
}

impl LiveService {
    /// Creates a service with an empty store.
    pub fn new(queue_capacity: usize) -> Self {
        Self::with_store(UpdateStore::new(), queue_capacity)
    }

    /// Creates a service around an existing (typically seeded) store.
    pub fn with_store(store: UpdateStore, queue_capacity: usize) -> Self {
        Self {
            sequencer: Mutex::new(Sequencer {
                store,
                hub: BroadcastHub::new(),
            }),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Attaches a new observer.
    ///
    /// The snapshot of the current store is queued as the observer's first
    /// frame and the observer is registered in the same critical section,
    /// so no publish can fall between the two.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError`] if the snapshot cannot be serialized or queued.
    pub async fn subscribe(&self) -> Result<Subscription, LiveError> {
        let (tx, frames) = mpsc::channel(self.queue_capacity);
        let connection = ObserverConnection::new(tx.clone());

        let mut sequencer = self.sequencer.lock().await;
        let snapshot = LiveFrame::Snapshot {
            records: sequencer.store.snapshot(),
        };
        let json = serde_json::to_string(&snapshot)?;
        tx.try_send(json)
            .map_err(|e| LiveError::SnapshotQueue(e.to_string()))?;
        let id = sequencer.hub.register(connection);
        let observers = sequencer.hub.len();
        drop(sequencer);

        tracing::info!(connection_id = %id, observers, "live observer attached");
        Ok(Subscription { id, frames })
    }

    /// Detaches an observer. Unknown ids are ignored.
    pub async fn unsubscribe(&self, id: ConnectionId) {
        let removed = self.sequencer.lock().await.hub.unregister(id);
        if removed {
            tracing::info!(connection_id = %id, "live observer detached");
        }
    }

    /// Returns every record, oldest first.
    pub async fn snapshot(&self) -> Vec<AnnouncementRecord> {
        self.sequencer.lock().await.store.snapshot()
    }

    /// Returns the records with an id greater than `after`, oldest first.
    pub async fn since(&self, after: u64) -> Vec<AnnouncementRecord> {
        self.sequencer.lock().await.store.since(after)
    }

    /// Number of records in the store.
    pub async fn len(&self) -> usize {
        self.sequencer.lock().await.store.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.sequencer.lock().await.store.is_empty()
    }

    /// Number of registered observers.
    pub async fn observer_count(&self) -> usize {
        self.sequencer.lock().await.hub.len()
    }
}

impl Default for LiveService {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
