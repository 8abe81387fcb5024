//! Shared application state for the voxrelay broker.
//!
//! One relay instance per process, constructed here and handed by
//! reference to connection handlers (no process-wide statics).

use std::sync::Arc;

use voxrelay_core::error::Result;

use crate::config::BrokerConfig;
use crate::obs::RelayMetrics;
use crate::relay::{Relay, RelayHandler};
use crate::services::ReadyTracker;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: BrokerConfig,
    relay: Arc<Relay>,
    ready: Arc<ReadyTracker>,
    metrics: Arc<RelayMetrics>,
}

impl AppState {
    /// Build application state and register built-in services.
    pub fn new(cfg: BrokerConfig) -> Result<Self> {
        let metrics = Arc::new(RelayMetrics::default());
        let relay = Arc::new(Relay::new(&cfg.relay, Arc::clone(&metrics)));

        let ready = Arc::new(ReadyTracker::new());
        relay.on_message(ReadyTracker::binding_key(), Arc::clone(&ready) as Arc<dyn RelayHandler>);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                relay,
                ready,
                metrics,
            }),
        })
    }

    pub fn cfg(&self) -> &BrokerConfig {
        &self.inner.cfg
    }

    pub fn relay(&self) -> Arc<Relay> {
        Arc::clone(&self.inner.relay)
    }

    pub fn ready(&self) -> Arc<ReadyTracker> {
        Arc::clone(&self.inner.ready)
    }

    pub fn metrics(&self) -> Arc<RelayMetrics> {
        Arc::clone(&self.inner.metrics)
    }
}
