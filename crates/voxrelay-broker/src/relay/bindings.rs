//! Binding table: handlers registered under exact `(kind, topic)` pairs.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use voxrelay_core::error::Result;
use voxrelay_core::protocol::{BindingKey, Envelope};

use crate::relay::registry::{ConnectionHandle, ConnectionRegistry};

/// Context handed to handlers: the originating connection plus fan-out
/// capability. Handler-produced envelopes go straight to peers; they are
/// not sequenced or stored, only inbound traffic is.
#[derive(Clone)]
pub struct HandlerCtx {
    conn: ConnectionHandle,
    registry: Arc<ConnectionRegistry>,
}

impl HandlerCtx {
    pub fn new(conn: ConnectionHandle, registry: Arc<ConnectionRegistry>) -> Self {
        Self { conn, registry }
    }

    /// The connection the dispatched envelope arrived on.
    pub fn conn(&self) -> &ConnectionHandle {
        &self.conn
    }

    /// Send an envelope back to the originating connection (best-effort).
    pub fn reply(&self, env: &Envelope) -> Result<()> {
        let text = encode(env)?;
        self.conn.try_send(axum::extract::ws::Message::Text(text));
        Ok(())
    }

    /// Send an envelope to every open connection, the sender included
    /// (best-effort per connection).
    pub fn send_all(&self, env: &Envelope) -> Result<()> {
        let text = encode(env)?;
        for c in self.registry.all_open() {
            c.try_send(axum::extract::ws::Message::Text(text.clone()));
        }
        Ok(())
    }
}

fn encode(env: &Envelope) -> Result<String> {
    serde_json::to_string(env)
        .map_err(|e| voxrelay_core::RelayError::Internal(format!("envelope encode failed: {e}")))
}

/// A registered message handler.
#[async_trait]
pub trait RelayHandler: Send + Sync {
    async fn handle(&self, ctx: HandlerCtx, env: Envelope) -> Result<()>;
}

/// Handlers keyed by exact `(kind, topic)` pair, accumulated in
/// registration order. Bindings live for the life of the process; there is
/// no removal operation.
#[derive(Default)]
pub struct BindingTable {
    map: DashMap<BindingKey, Vec<Arc<dyn RelayHandler>>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self { map: DashMap::new() }
    }

    pub fn register(&self, key: BindingKey, handler: Arc<dyn RelayHandler>) {
        self.map.entry(key).or_default().push(handler);
    }

    /// Handlers for the exact pair, in registration order. Both components
    /// must match; there is no wildcard lookup.
    pub fn matching(&self, key: &BindingKey) -> Vec<Arc<dyn RelayHandler>> {
        self.map.get(key).map(|v| v.value().clone()).unwrap_or_default()
    }

    pub fn keys(&self) -> Vec<BindingKey> {
        self.map.iter().map(|e| e.key().clone()).collect()
    }
}
