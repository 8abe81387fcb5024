//! Protocol module: the JSON envelope and binding keys.
//!
//! One JSON object per text frame. Parsing is lenient on purpose: missing
//! `kind`/`origin` are normalized to `"unknown"`, unknown extra fields are
//! ignored, so independently-versioned peers can talk through the broker
//! without lockstep upgrades. Only non-JSON text is rejected.

pub mod envelope;

pub use envelope::{kinds, BindingKey, Envelope};
