//! Session limits configuration.

use serde::Deserialize;

use super::defaults::{default_max_frame_bytes, default_outbound_queue};

/// Session limits configuration.
///
/// Every session gets its own outbound queue, so a slow reader only ever
/// backs up itself.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Per-session outbound queue capacity in messages (default: 64).
    /// A full queue drops the message for that recipient only.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
    /// Maximum encoded frame length in bytes (default: 4096).
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            outbound_queue: default_outbound_queue(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}
