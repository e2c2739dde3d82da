use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod config;
pub mod source;

pub use config::ClientConfig;
pub use source::{NotificationSource, TransportError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 0,
    High = 2,
    Urgent = 3,
    // Must stay the last variant for `serde(other)`; ordering follows the discriminants.
    #[default]
    #[serde(other)]
    Medium = 1,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    /// Free-form category tag; the server decides the vocabulary.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_newer_than(&self, watermark: DateTime<Utc>) -> bool {
        self.created_at > watermark
    }
}

/// One page of `GET /notifications`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub data: Vec<Notification>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
}

fn first_page() -> u32 {
    1
}

impl NotificationPage {
    /// The well-formed result handed out when nobody is logged in or a read fails.
    pub fn empty() -> Self {
        Self {
            success: false,
            count: 0,
            data: Vec::new(),
            total: 0,
            unread_count: 0,
            page: 1,
            pages: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub unread_only: bool,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            unread_only: false,
        }
    }
}

impl ListParams {
    pub fn recent_unread(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            unread_only: true,
        }
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("unreadOnly", self.unread_only.to_string()),
        ]
    }
}
