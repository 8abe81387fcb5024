//! Built-in broker services.

pub mod ready;

pub use ready::ReadyTracker;
