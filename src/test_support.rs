use crate::domain::{
    ListParams, Notification, NotificationPage, NotificationSource, Priority, TransportError,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

pub(crate) fn notification_at(id: &str, created_at: DateTime<Utc>) -> Notification {
    Notification {
        id: id.to_string(),
        title: format!("Notification {id}"),
        message: "You have a new update".to_string(),
        kind: "application".to_string(),
        priority: Priority::Medium,
        is_read: false,
        link: None,
        created_at,
    }
}

pub(crate) fn notification(id: &str, secs_from_now: i64) -> Notification {
    notification_at(id, Utc::now() + Duration::seconds(secs_from_now))
}

/// Scriptable in-memory source that records how it was called.
#[derive(Default)]
pub(crate) struct FakeSource {
    notifications: Mutex<Vec<Notification>>,
    unread: Mutex<u64>,
    failing: AtomicBool,
    list_calls: AtomicUsize,
    count_calls: AtomicUsize,
    writes: Mutex<Vec<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    unread_gate: Mutex<Option<Arc<Notify>>>,
    write_gate: Mutex<Option<(String, Arc<Notify>)>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_notifications(&self, notifications: Vec<Notification>) {
        *self.notifications.lock() = notifications;
    }

    pub(crate) fn set_unread(&self, count: u64) {
        *self.unread.lock() = count;
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Holds every `list` call until the returned `Notify` is signalled.
    pub(crate) fn hold_list(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    /// Holds every `unread_count` call until the returned `Notify` is signalled.
    pub(crate) fn hold_unread(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.unread_gate.lock() = Some(gate.clone());
        gate
    }

    /// Holds the write recorded as `label` (e.g. `read:n1`) until signalled.
    pub(crate) fn hold_write(&self, label: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.write_gate.lock() = Some((label.to_string(), gate.clone()));
        gate
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    fn check(&self) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Status(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(())
    }

    async fn record(&self, write: String) -> Result<(), TransportError> {
        let gate = self
            .write_gate
            .lock()
            .as_ref()
            .filter(|(label, _)| *label == write)
            .map(|(_, gate)| gate.clone());
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check()?;
        self.writes.lock().push(write);
        Ok(())
    }
}

#[async_trait]
impl NotificationSource for FakeSource {
    async fn list(&self, params: ListParams) -> Result<NotificationPage, TransportError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check()?;

        let all = self.notifications.lock().clone();
        let unread_count = all.iter().filter(|n| !n.is_read).count() as u64;
        let data: Vec<Notification> = all
            .iter()
            .filter(|n| !params.unread_only || !n.is_read)
            .take(params.limit as usize)
            .cloned()
            .collect();

        Ok(NotificationPage {
            success: true,
            count: data.len() as u64,
            total: all.len() as u64,
            unread_count,
            page: params.page,
            pages: 1,
            data,
        })
    }

    async fn unread_count(&self) -> Result<u64, TransportError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.unread_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check()?;
        Ok(*self.unread.lock())
    }

    async fn mark_read(&self, id: &str) -> Result<(), TransportError> {
        self.record(format!("read:{id}")).await
    }

    async fn mark_all_read(&self) -> Result<(), TransportError> {
        self.record("mark-all-read".to_string()).await
    }

    async fn delete(&self, id: &str) -> Result<(), TransportError> {
        self.record(format!("delete:{id}")).await
    }

    async fn delete_all_read(&self) -> Result<(), TransportError> {
        self.record("clear-read".to_string()).await
    }
}
