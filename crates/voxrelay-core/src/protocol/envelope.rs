//! The envelope wire format and binding keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved envelope kinds used by the surrounding system.
pub mod kinds {
    /// Greeting / bootstrap class, sent by the broker on connect and by the
    /// host's connect hooks.
    pub const INIT: &str = "init";
    /// Acknowledgement sent back to a sender after each processed frame.
    pub const ACK: &str = "ack";
    /// Readiness announcement class, sent by a worker once it can serve.
    pub const READY: &str = "ready";
    /// Heartbeat class, suppressed from info-level frame logs.
    pub const PING: &str = "ping";
    /// Heartbeat topic, suppressed from info-level frame logs.
    pub const HEARTBEAT_TOPIC: &str = "heartbeat";
    /// `origin` value for frames produced by the broker itself.
    pub const RELAY_ORIGIN: &str = "relay";
    /// Normalized value for absent `kind`/`origin` fields.
    pub const UNKNOWN: &str = "unknown";
}

fn default_unknown() -> String {
    kinds::UNKNOWN.to_string()
}

/// One relay message unit.
///
/// `sequence` is broker-assigned; inbound frames carry `None` and any value
/// a sender puts there is overwritten when the frame is stamped. `payload`
/// is opaque to the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Category of message (event/init/ping/action/...).
    #[serde(default = "default_unknown")]
    pub kind: String,
    /// Optional tag narrowing `kind` (e.g. a specific event name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Logical sender name, stable across reconnects. This is the
    /// reconnection identity key, not tied to the physical connection.
    #[serde(default = "default_unknown")]
    pub origin: String,
    /// Arbitrary structured value, never inspected by the broker.
    #[serde(default)]
    pub payload: Value,
    /// Broker-assigned, strictly increasing across the process lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl Envelope {
    /// Build a broker-originated envelope (greeting, ack).
    pub fn from_relay(kind: &str, topic: Option<&str>, payload: Value) -> Self {
        Self {
            kind: kind.to_string(),
            topic: topic.map(str::to_string),
            origin: kinds::RELAY_ORIGIN.to_string(),
            payload,
            sequence: None,
        }
    }

    /// Whether this envelope is heartbeat-class traffic.
    pub fn is_heartbeat(&self) -> bool {
        self.kind == kinds::PING || self.topic.as_deref() == Some(kinds::HEARTBEAT_TOPIC)
    }
}

/// Exact `(kind, topic)` pair under which handlers are registered.
///
/// A `None` topic means "the envelope carries no topic"; it is an exact
/// match against topic-less envelopes, not a wildcard. Wildcard matching
/// (one component standing for "any") is deliberately unimplemented: the
/// dispatch contract is exact-pair lookup only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub kind: String,
    pub topic: Option<String>,
}

impl BindingKey {
    pub fn of(kind: &str, topic: Option<&str>) -> Self {
        Self {
            kind: kind.to_string(),
            topic: topic.map(str::to_string),
        }
    }

    /// The key an envelope is dispatched under.
    pub fn from_envelope(env: &Envelope) -> Self {
        Self {
            kind: env.kind.clone(),
            topic: env.topic.clone(),
        }
    }
}
