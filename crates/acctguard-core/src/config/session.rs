//! Session registry configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum non-expired sessions a user may hold at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_sessions: u32,
    /// Absolute session lifetime in hours, counted from creation.
    #[serde(default = "default_absolute_timeout")]
    pub absolute_timeout_hours: i64,
    /// Random bytes per session token. Hex encoding doubles the length.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: default_max_concurrent(),
            absolute_timeout_hours: default_absolute_timeout(),
            token_bytes: default_token_bytes(),
        }
    }
}

fn default_max_concurrent() -> u32 {
    3
}

fn default_absolute_timeout() -> i64 {
    24
}

fn default_token_bytes() -> usize {
    32
}
