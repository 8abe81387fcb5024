//! The relay pipeline.
//!
//! For each inbound text frame: parse -> stamp -> replay-or-advance ->
//! append to history -> broadcast to the other open connections ->
//! dispatch bindings -> ack the sender. Stamp, history, replay, and
//! broadcast happen under one lock so receiver queues always follow
//! stamp order; handlers run after, off the lock. Every failure mode
//! degrades per-connection or per-handler; nothing here stops the broker
//! from serving other peers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Message;
use tokio::sync::Mutex;

use voxrelay_core::error::Result;
use voxrelay_core::protocol::{kinds, BindingKey, Envelope};

use crate::config::RelaySection;
use crate::obs::RelayMetrics;
use crate::relay::bindings::{BindingTable, HandlerCtx, RelayHandler};
use crate::relay::registry::{ConnectionHandle, ConnectionRegistry};
use crate::relay::replay::ReplayBuffer;
use crate::relay::sequencer::Sequencer;

/// Metric label for an envelope kind. Kinds are peer-controlled free-form
/// strings; anything outside the reserved set is bucketed as "other" so
/// the label map stays bounded.
fn kind_label(kind: &str) -> &'static str {
    match kind {
        kinds::INIT => kinds::INIT,
        kinds::ACK => kinds::ACK,
        kinds::READY => kinds::READY,
        kinds::PING => kinds::PING,
        kinds::UNKNOWN => kinds::UNKNOWN,
        _ => "other",
    }
}

/// Hook invoked once per new connection, before any frames are processed.
/// The host uses this to push application bootstrap state to fresh peers.
#[async_trait]
pub trait ConnectHook: Send + Sync {
    async fn on_connect(&self, ctx: HandlerCtx) -> Result<()>;
}

/// Sequencer, ring, and watermark table share one lock: concurrent frames
/// from different connections must not race on sequence assignment or ring
/// mutation. The guard is never held across an await.
struct RelayState {
    sequencer: Sequencer,
    replay: ReplayBuffer,
}

/// One relay instance per process, passed by reference to connection
/// handlers. Owns the registry, sequencer, history ring, watermark table,
/// binding table, and connect hooks.
pub struct Relay {
    registry: Arc<ConnectionRegistry>,
    bindings: BindingTable,
    hooks: std::sync::RwLock<Vec<Arc<dyn ConnectHook>>>,
    state: Mutex<RelayState>,
    metrics: Arc<RelayMetrics>,
    log_frames: bool,
}

impl Relay {
    pub fn new(cfg: &RelaySection, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            bindings: BindingTable::new(),
            hooks: std::sync::RwLock::new(Vec::new()),
            state: Mutex::new(RelayState {
                sequencer: Sequencer::new(),
                replay: ReplayBuffer::new(cfg.history_capacity),
            }),
            metrics,
            log_frames: cfg.log_frames,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<RelayMetrics> {
        &self.metrics
    }

    /// Register a handler under an exact `(kind, topic)` pair.
    pub fn on_message(&self, key: BindingKey, handler: Arc<dyn RelayHandler>) {
        self.bindings.register(key, handler);
    }

    /// Register a connect hook. Hooks accumulate and run in registration
    /// order, once per new connection.
    pub fn on_connect(&self, hook: Arc<dyn ConnectHook>) {
        match self.hooks.write() {
            Ok(mut hooks) => hooks.push(hook),
            Err(poisoned) => poisoned.into_inner().push(hook),
        }
    }

    /// Run all connect hooks for a freshly registered connection.
    pub async fn run_connect_hooks(&self, conn: &ConnectionHandle) {
        let hooks: Vec<Arc<dyn ConnectHook>> = match self.hooks.read() {
            Ok(hooks) => hooks.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        for hook in hooks {
            let ctx = HandlerCtx::new(conn.clone(), Arc::clone(&self.registry));
            if let Err(e) = hook.on_connect(ctx).await {
                tracing::error!(conn = conn.id(), error = %e, "connect hook failed");
            }
        }
    }

    /// Process one inbound text frame from `conn`.
    ///
    /// Malformed (non-JSON) text never becomes an envelope: it is dropped
    /// with a warning, never sequenced, stored, dispatched, or acked.
    pub async fn handle_frame(&self, conn: &ConnectionHandle, text: &str) {
        let mut env: Envelope = match serde_json::from_str(text) {
            Ok(env) => env,
            Err(e) => {
                self.metrics.malformed_frames.inc(&[]);
                tracing::warn!(conn = conn.id(), error = %e, "non-JSON frame dropped");
                return;
            }
        };

        {
            let mut state = self.state.lock().await;
            let seq = state.sequencer.stamp(&mut env);
            let backlog = if conn.identify(&env.origin) {
                // First frame: identity announcement. The watermark is
                // read, not advanced, and the missed envelopes are
                // computed before this frame enters the ring.
                Some(state.replay.backlog(&env.origin))
            } else {
                if let Some(peer) = conn.peer() {
                    state.replay.advance(&peer, seq);
                }
                None
            };
            state.replay.append(env.clone());

            // Replay and fan-out stay under the lock. They are plain
            // try_sends, and queueing them before the next frame can be
            // stamped keeps a reconnecting peer's backlog un-interleaved
            // with new traffic and every receiver's queue in stamp order.
            if let Some(missed) = backlog {
                self.replay_backlog(conn, &missed);
            }
            self.broadcast(&env, Some(conn.id()));
        }

        self.metrics.frames_in.inc(&[("kind", kind_label(&env.kind))]);

        self.dispatch(conn, &env).await;
        self.ack(conn, &env);

        if self.log_frames && !env.is_heartbeat() {
            tracing::info!(
                kind = %env.kind,
                topic = env.topic.as_deref().unwrap_or(""),
                origin = %env.origin,
                sequence = env.sequence.unwrap_or(0),
                "frame relayed"
            );
        }
    }

    fn replay_backlog(&self, conn: &ConnectionHandle, missed: &[Envelope]) {
        for m in missed {
            self.send_envelope(conn, m);
        }
        self.metrics.replayed.add(&[], missed.len() as u64);
        tracing::debug!(
            conn = conn.id(),
            peer = %conn.peer().unwrap_or_default(),
            missed = missed.len(),
            "peer identified, backlog sent"
        );
    }

    /// Invoke every handler bound to the envelope's exact `(kind, topic)`
    /// pair, in registration order. A failing handler never prevents the
    /// remaining handlers, the broadcast, or the ack from running.
    async fn dispatch(&self, conn: &ConnectionHandle, env: &Envelope) {
        let key = BindingKey::from_envelope(env);
        for handler in self.bindings.matching(&key) {
            let ctx = HandlerCtx::new(conn.clone(), Arc::clone(&self.registry));
            if let Err(e) = handler.handle(ctx, env.clone()).await {
                self.metrics.handler_errors.inc(&[("kind", &env.kind)]);
                tracing::error!(kind = %env.kind, error = %e, "binding handler failed");
            }
        }
    }

    /// Fan the envelope out to every open connection except its sender.
    /// Serialized once; closed or backpressured receivers are skipped.
    pub fn broadcast(&self, env: &Envelope, exclude: Option<u64>) {
        let text = match serde_json::to_string(env) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "broadcast encode failed");
                return;
            }
        };
        for c in self.registry.all_open() {
            if Some(c.id()) == exclude {
                continue;
            }
            if c.try_send(Message::Text(text.clone())) {
                self.metrics.broadcast_sends.inc(&[]);
            }
        }
    }

    /// Acknowledge processing (not delivery) of a frame to its sender.
    fn ack(&self, conn: &ConnectionHandle, env: &Envelope) {
        let ack = Envelope::from_relay(
            kinds::ACK,
            None,
            serde_json::json!({ "received": env.kind }),
        );
        self.send_envelope(conn, &ack);
    }

    fn send_envelope(&self, conn: &ConnectionHandle, env: &Envelope) {
        match serde_json::to_string(env) {
            Ok(text) => {
                conn.try_send(Message::Text(text));
            }
            Err(e) => tracing::error!(error = %e, "envelope encode failed"),
        }
    }

    /// Current history ring contents, oldest first.
    pub async fn history(&self) -> Vec<Envelope> {
        self.state.lock().await.replay.snapshot()
    }

    /// Highest sequence assigned so far (0 if none).
    pub async fn last_sequence(&self) -> u64 {
        self.state.lock().await.sequencer.last()
    }

    /// Watermark for a peer identity, if any frame from it advanced one.
    pub async fn watermark(&self, origin: &str) -> Option<u64> {
        self.state.lock().await.replay.watermark(origin)
    }
}
