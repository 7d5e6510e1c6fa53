//! Wire protocol configuration shared by all three services.

use super::defaults::default_max_frame_size;
use serde::{Deserialize, Serialize};

/// Frame codec limits (spec §4.1).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProtocolConfig {
    /// Upper bound on a single frame's payload length, in bytes.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_frame_size: default_max_frame_size(),
        }
    }
}
