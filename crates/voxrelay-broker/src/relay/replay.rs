//! Replay buffer: bounded envelope history plus per-peer watermarks.
//!
//! This is what makes the broker safe across peer restarts: a peer that
//! reconnects with a fresh connection but a stable `origin` gets resent
//! exactly the envelopes produced while it was away, bounded by the ring's
//! retention window. Best-effort, not durable: if a peer is gone longer
//! than the ring remembers, the gap is silent.

use std::collections::{HashMap, VecDeque};

use voxrelay_core::protocol::Envelope;

/// Sole writer of the history ring and the watermark table.
#[derive(Debug)]
pub struct ReplayBuffer {
    capacity: usize,
    ring: VecDeque<Envelope>,
    watermarks: HashMap<String, u64>,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ring: VecDeque::with_capacity(capacity),
            watermarks: HashMap::new(),
        }
    }

    /// Everything in the ring a peer has not seen yet, ascending.
    ///
    /// Called on a connection's first frame; the first frame itself must
    /// NOT advance the watermark (it is an identity announcement, the
    /// reconnect handshake), so this is a pure read.
    pub fn backlog(&self, origin: &str) -> Vec<Envelope> {
        let last_seen = self.watermarks.get(origin).copied().unwrap_or(0);
        self.ring
            .iter()
            .filter(|h| h.sequence.unwrap_or(0) > last_seen)
            .cloned()
            .collect()
    }

    /// Record that `origin` has processed everything up to `sequence`.
    /// Called once per non-first frame from an identified connection.
    pub fn advance(&mut self, origin: &str, sequence: u64) {
        self.watermarks.insert(origin.to_string(), sequence);
    }

    /// Append to the ring, evicting the oldest entry at capacity.
    pub fn append(&mut self, env: Envelope) {
        if self.ring.len() >= self.capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(env);
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Current ring contents, oldest first.
    pub fn snapshot(&self) -> Vec<Envelope> {
        self.ring.iter().cloned().collect()
    }

    pub fn watermark(&self, origin: &str) -> Option<u64> {
        self.watermarks.get(origin).copied()
    }
}
