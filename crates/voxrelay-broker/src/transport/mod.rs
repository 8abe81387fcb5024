//! Transport layer: WebSocket sessions feeding the relay pipeline.

pub mod ws;
