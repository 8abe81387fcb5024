//! Connection registry: currently-open connections, independent of peer
//! identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use axum::extract::ws::Message;
use dashmap::DashMap;

/// Handle to one live connection: its outbound queue sender plus a peer
/// identity that is settable exactly once, on the first valid frame.
#[derive(Clone)]
pub struct ConnectionHandle {
    id: u64,
    tx: tokio::sync::mpsc::Sender<Message>,
    peer: Arc<OnceLock<String>>,
}

impl ConnectionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Peer identity, once the connection has been identified.
    pub fn peer(&self) -> Option<String> {
        self.peer.get().cloned()
    }

    /// Mark this connection as identified by `origin`.
    /// Returns true when this was the connection's first frame.
    pub fn identify(&self, origin: &str) -> bool {
        self.peer.set(origin.to_string()).is_ok()
    }

    /// Best-effort send: a closed or backpressured connection is skipped.
    /// Returns whether the message was queued.
    pub fn try_send(&self, msg: Message) -> bool {
        self.tx.try_send(msg).is_ok()
    }
}

/// Open-connection set. Registration never fails; a send to a connection
/// that has since closed is simply skipped.
#[derive(Default)]
pub struct ConnectionRegistry {
    conns: DashMap<u64, ConnectionHandle>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn register(&self, tx: tokio::sync::mpsc::Sender<Message>) -> ConnectionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = ConnectionHandle {
            id,
            tx,
            peer: Arc::new(OnceLock::new()),
        };
        self.conns.insert(id, handle.clone());
        handle
    }

    pub fn unregister(&self, id: u64) {
        if let Some((_, handle)) = self.conns.remove(&id) {
            match handle.peer() {
                Some(peer) => tracing::debug!(conn = id, %peer, "peer disconnected"),
                None => tracing::debug!(conn = id, "connection closed before identifying"),
            }
        }
    }

    /// Live view of the open set, used by broadcast fan-out.
    pub fn all_open(&self) -> Vec<ConnectionHandle> {
        self.conns.iter().map(|e| e.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}
