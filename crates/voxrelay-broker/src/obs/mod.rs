//! Observability: dependency-free metrics for the broker.

pub mod metrics;

pub use metrics::RelayMetrics;
