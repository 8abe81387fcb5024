use serde::Deserialize;
use voxrelay_core::error::{RelayError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerConfig {
    pub version: u32,

    #[serde(default)]
    pub relay: RelaySection,
}

impl BrokerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::UnsupportedVersion);
        }
        self.relay.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// History ring retention, in envelopes.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Gate for the info-level per-frame log (heartbeats stay suppressed
    /// regardless). Gates only that log: warn/error/debug emissions flow
    /// through `tracing` and are filtered by `RUST_LOG`, so failures stay
    /// visible even with frame logging off.
    #[serde(default = "default_log_frames")]
    pub log_frames: bool,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            history_capacity: default_history_capacity(),
            log_frames: default_log_frames(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(RelayError::BadRequest(
                "relay.history_capacity must be at least 1".into(),
            ));
        }
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(RelayError::BadRequest(
                "relay.listen must be a valid socket address".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8765".into()
}
fn default_history_capacity() -> usize {
    10
}
fn default_log_frames() -> bool {
    true
}
