use crate::domain::{ListParams, NotificationPage, NotificationSource, TransportError};
use std::sync::Arc;

/// Reads degrade to an empty page or zero; writes report failures to the caller.
#[derive(Clone)]
pub struct NotificationTransport {
    source: Arc<dyn NotificationSource>,
}

impl NotificationTransport {
    pub fn new(source: Arc<dyn NotificationSource>) -> Self {
        Self { source }
    }

    pub async fn fetch_notifications(&self, params: ListParams) -> NotificationPage {
        match self.source.list(params).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Failed to fetch notifications: {e}");
                NotificationPage::empty()
            }
        }
    }

    pub async fn fetch_unread_count(&self) -> u64 {
        self.source.unread_count().await.unwrap_or_else(|e| {
            log::warn!("Failed to fetch unread count: {e}");
            0
        })
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), TransportError> {
        self.source.mark_read(id).await
    }

    pub async fn mark_all_read(&self) -> Result<(), TransportError> {
        self.source.mark_all_read().await
    }

    pub async fn delete_one(&self, id: &str) -> Result<(), TransportError> {
        self.source.delete(id).await
    }

    pub async fn delete_all_read(&self) -> Result<(), TransportError> {
        self.source.delete_all_read().await
    }
}
