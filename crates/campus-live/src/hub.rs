//! Observer bookkeeping and best-effort fan-out.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

/// Opaque hub-internal identity of one observer connection.
///
/// This is bookkeeping only, not an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One live push channel to one observer.
///
/// The hub writes serialized frames into a bounded queue; a writer task on
/// the other end forwards them to the socket. The connection is open for
/// as long as that writer holds the receiving half.
#[derive(Debug)]
pub struct ObserverConnection {
    id: ConnectionId,
    sender: mpsc::Sender<String>,
}

impl ObserverConnection {
    /// Wraps the sending half of an observer's outbound queue.
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    /// The hub-internal id of this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Whether the receiving side is still attached.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Outcome of a single [`BroadcastHub::push`].
///
/// Internal diagnostics only; it is never turned into an error for the
/// publisher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Frames queued successfully.
    pub delivered: usize,
    /// Open connections whose queue was full. They are dropped from the set
    /// so the observer sees its channel end instead of a gap.
    pub skipped: usize,
    /// Closed connections skipped and removed from the set.
    pub pruned: usize,
}

/// The set of currently connected observers.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    connections: HashMap<ConnectionId, ObserverConnection>,
}

impl BroadcastHub {
    /// Creates a hub with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the active set and returns its id.
    pub fn register(&mut self, connection: ObserverConnection) -> ConnectionId {
        let id = connection.id();
        self.connections.insert(id, connection);
        tracing::debug!(connection_id = %id, observers = self.connections.len(), "observer registered");
        id
    }

    /// Removes a connection. Removing an absent id is a no-op.
    ///
    /// Returns whether a connection was actually removed.
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id).is_some();
        if removed {
            tracing::debug!(connection_id = %id, observers = self.connections.len(), "observer unregistered");
        }
        removed
    }

    /// Queues `frame` on every open connection.
    ///
    /// Closed connections are skipped and pruned. An observer whose queue is
    /// full is disconnected rather than served out of order; every other
    /// observer still gets the frame.
    pub fn push(&mut self, frame: &str) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        self.connections.retain(|id, connection| {
            if !connection.is_open() {
                tracing::debug!(connection_id = %id, "pruning closed observer");
                report.pruned += 1;
                return false;
            }

            match connection.sender.try_send(frame.to_owned()) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %id,
                        "disconnecting slow observer with a full queue"
                    );
                    report.skipped += 1;
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = %id, "observer closed during push");
                    report.pruned += 1;
                    false
                }
            }
        });

        report
    }

    /// Number of connections currently in the set, open or not yet pruned.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
