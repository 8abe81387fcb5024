//! Relay pipeline modules.
//!
//! - `sequencer`: strictly increasing envelope ids.
//! - `replay`: bounded history ring + per-peer watermarks.
//! - `registry`: open-connection set, independent of peer identity.
//! - `bindings`: handlers keyed by exact `(kind, topic)` pairs.
//! - `relay`: the instance tying them together behind one lock.

pub mod bindings;
pub mod registry;
#[allow(clippy::module_inception)]
pub mod relay;
pub mod replay;
pub mod sequencer;

pub use bindings::{BindingTable, HandlerCtx, RelayHandler};
pub use registry::{ConnectionHandle, ConnectionRegistry};
pub use relay::{ConnectHook, Relay};
pub use replay::ReplayBuffer;
pub use sequencer::Sequencer;
