use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SUBSCRIBE_RETRY_MS: u64 = 7_000;
pub const DEFAULT_SYNC_HEARTBEAT_MS: u64 = 30_000;
pub const DEFAULT_ASSET_ROOT: &str = "components";

/// Per-screen runtime knobs. Absent keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// How long a subscribe request waits for `OK` before it is re-issued.
    pub subscribe_retry_ms: u64,
    pub sync_heartbeat_ms: u64,
    /// Root folder for per-class widget assets.
    pub asset_root: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            subscribe_retry_ms: DEFAULT_SUBSCRIBE_RETRY_MS,
            sync_heartbeat_ms: DEFAULT_SYNC_HEARTBEAT_MS,
            asset_root: DEFAULT_ASSET_ROOT.to_string(),
        }
    }
}

impl RuntimeSettings {
    pub fn subscribe_retry(&self) -> Duration {
        Duration::from_millis(self.subscribe_retry_ms)
    }

    pub fn sync_heartbeat(&self) -> Duration {
        Duration::from_millis(self.sync_heartbeat_ms)
    }

    pub fn asset_folder(&self, class_name: &str) -> String {
        let root = self.asset_root.trim_end_matches('/');
        if root.is_empty() {
            format!("{class_name}/")
        } else {
            format!("{root}/{class_name}/")
        }
    }
}
