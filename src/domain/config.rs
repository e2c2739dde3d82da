use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root; `/notifications` is appended to it.
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub unread_interval_ms: u64,
    pub recent_limit: u32,
    pub page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            poll_interval_ms: 10_000,
            unread_interval_ms: 5_000,
            recent_limit: 5,
            page_size: 20,
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn unread_interval(&self) -> Duration {
        Duration::from_millis(self.unread_interval_ms.max(1))
    }
}
