//! Top-level facade crate for voxrelay.
//!
//! Re-exports core types and the broker library so users can depend on a single crate.

pub mod core {
    pub use voxrelay_core::*;
}

pub mod broker {
    pub use voxrelay_broker::*;
}
