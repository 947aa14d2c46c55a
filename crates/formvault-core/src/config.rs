//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the protocol engine.
///
/// Embedders usually deserialize this from their own configuration
/// file; every field has a default so an empty object is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// How long a call may wait for its reply before failing with a
    /// timeout. The pending entry is cleaned up either way.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Maximum wire frame size in bytes. Browsers cap daemon-bound
    /// native messages at 1 MiB, so that is the default.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
}

impl ClientConfig {
    /// Call timeout as a [`Duration`].
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            max_frame_len: default_max_frame_len(),
        }
    }
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_max_frame_len() -> usize {
    1024 * 1024
}
