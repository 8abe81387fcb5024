//! voxrelay core: envelope wire format, binding keys, and error types.
//!
//! This crate defines the JSON wire contract and error surface shared by the
//! broker and any host-side consumers. It intentionally carries no transport
//! or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `RelayError`/`Result` so a broker
//! process does not crash on malformed peer traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{RelayError, Result};
