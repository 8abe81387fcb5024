//! voxrelay broker library entry.
//!
//! This crate wires the WebSocket transport, the relay pipeline (sequencer,
//! replay buffer, binding table, connection registry, broadcast), and the
//! built-in services into a cohesive broker stack. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod relay;
pub mod router;
pub mod services;
pub mod transport;
