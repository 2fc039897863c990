//! Response cache configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::default_true;

/// On-disk cache for upstream responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether responses are cached
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cache database file (default: .cache/openmeteo.redb)
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Entry lifetime in seconds (default: 1 hour)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".cache/openmeteo.redb")
}

const fn default_ttl_secs() -> u64 {
    60 * 60 // 1 hour
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_cache_path(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    /// Entry lifetime as a Duration
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
