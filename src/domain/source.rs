use super::{ListParams, NotificationPage};
use async_trait::async_trait;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("server responded with {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, TransportError::Unauthenticated)
    }
}

#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn list(&self, params: ListParams) -> Result<NotificationPage, TransportError>;

    async fn unread_count(&self) -> Result<u64, TransportError>;

    async fn mark_read(&self, id: &str) -> Result<(), TransportError>;

    async fn mark_all_read(&self) -> Result<(), TransportError>;

    async fn delete(&self, id: &str) -> Result<(), TransportError>;

    async fn delete_all_read(&self) -> Result<(), TransportError>;
}
