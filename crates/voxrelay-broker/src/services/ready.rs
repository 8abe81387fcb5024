//! Worker readiness tracking.
//!
//! The host learns that an external worker process can serve by watching
//! for `ready`-class frames. This handler records the announcing origin so
//! the host can query readiness without subscribing itself.

use async_trait::async_trait;
use dashmap::DashSet;

use voxrelay_core::error::Result;
use voxrelay_core::protocol::{kinds, BindingKey, Envelope};

use crate::relay::{HandlerCtx, RelayHandler};

#[derive(Default)]
pub struct ReadyTracker {
    ready: DashSet<String>,
}

impl ReadyTracker {
    pub fn new() -> Self {
        Self { ready: DashSet::new() }
    }

    /// The binding key this tracker expects to be registered under.
    pub fn binding_key() -> BindingKey {
        BindingKey::of(kinds::READY, None)
    }

    pub fn is_ready(&self, origin: &str) -> bool {
        self.ready.contains(origin)
    }

    pub fn ready_peers(&self) -> Vec<String> {
        self.ready.iter().map(|r| r.key().to_string()).collect()
    }
}

#[async_trait]
impl RelayHandler for ReadyTracker {
    async fn handle(&self, _ctx: HandlerCtx, env: Envelope) -> Result<()> {
        if self.ready.insert(env.origin.clone()) {
            tracing::info!(origin = %env.origin, "peer announced ready");
        }
        Ok(())
    }
}
