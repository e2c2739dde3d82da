use super::SharedAlertBoard;
use crate::domain::{ListParams, Notification, TransportError};
use crate::infra::NotificationTransport;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct InboxState {
    items: Vec<Notification>,
    total: u64,
    unread_count: u64,
    page: u32,
    pages: u32,
}

struct Removal {
    index: usize,
    notification: Notification,
    total_delta: u64,
    unread_delta: u64,
}

/// What one write changed locally, so a failure reverts only that write.
enum Undo {
    Unread { ids: Vec<String>, unread_delta: u64 },
    Removed(Vec<Removal>),
}

impl InboxState {
    fn take_unread(&mut self, delta: u64) -> u64 {
        let before = self.unread_count;
        self.unread_count = before.saturating_sub(delta);
        before - self.unread_count
    }

    fn mark_read(&mut self, id: &str) -> Undo {
        let mut ids = Vec::new();
        if let Some(item) = self.items.iter_mut().find(|n| n.id == id)
            && !item.is_read
        {
            item.is_read = true;
            ids.push(item.id.clone());
        }
        let unread_delta = self.take_unread(ids.len() as u64);
        Undo::Unread { ids, unread_delta }
    }

    fn mark_all_read(&mut self) -> Undo {
        let ids: Vec<String> = self
            .items
            .iter_mut()
            .filter(|n| !n.is_read)
            .map(|n| {
                n.is_read = true;
                n.id.clone()
            })
            .collect();
        let unread_delta = self.unread_count;
        self.unread_count = 0;
        Undo::Unread { ids, unread_delta }
    }

    fn remove_where(&mut self, mut pred: impl FnMut(&Notification) -> bool) -> Undo {
        let mut removals = Vec::new();
        let mut index = 0;
        let mut original_index = 0;
        while index < self.items.len() {
            if pred(&self.items[index]) {
                let notification = self.items.remove(index);
                let total_before = self.total;
                self.total = total_before.saturating_sub(1);
                let unread_delta = if notification.is_read {
                    0
                } else {
                    self.take_unread(1)
                };
                removals.push(Removal {
                    index: original_index,
                    notification,
                    total_delta: total_before - self.total,
                    unread_delta,
                });
            } else {
                index += 1;
            }
            original_index += 1;
        }
        Undo::Removed(removals)
    }

    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Unread { ids, unread_delta } => {
                for item in self.items.iter_mut().filter(|n| ids.contains(&n.id)) {
                    item.is_read = false;
                }
                self.unread_count += unread_delta;
            }
            Undo::Removed(removals) => {
                for removal in removals {
                    if self.items.iter().any(|n| n.id == removal.notification.id) {
                        continue;
                    }
                    let at = removal.index.min(self.items.len());
                    self.items.insert(at, removal.notification);
                    self.total += removal.total_delta;
                    self.unread_count += removal.unread_delta;
                }
            }
        }
    }
}

/// Local copy of one page of notifications.
///
/// Writes are applied locally first. If the server refuses one, only that
/// write's own change is reverted; other writes and polled updates stay.
/// The unread count may lag the list until the next refresh.
pub struct Inbox {
    transport: NotificationTransport,
    alerts: SharedAlertBoard,
    state: RwLock<InboxState>,
}

impl Inbox {
    pub fn new(transport: NotificationTransport, alerts: SharedAlertBoard) -> Self {
        Self {
            transport,
            alerts,
            state: RwLock::new(InboxState {
                page: 1,
                ..Default::default()
            }),
        }
    }

    pub fn alerts(&self) -> &SharedAlertBoard {
        &self.alerts
    }

    pub async fn refresh(&self, params: ListParams) -> usize {
        let page = self.transport.fetch_notifications(params).await;
        let mut state = self.state.write();
        *state = InboxState {
            items: page.data,
            total: page.total,
            unread_count: page.unread_count,
            page: page.page,
            pages: page.pages,
        };
        state.items.len()
    }

    pub fn items(&self) -> Vec<Notification> {
        self.state.read().items.clone()
    }

    pub fn unread_count(&self) -> u64 {
        self.state.read().unread_count
    }

    pub fn total(&self) -> u64 {
        self.state.read().total
    }

    pub fn page(&self) -> (u32, u32) {
        let state = self.state.read();
        (state.page, state.pages)
    }

    /// Puts a polled notification at the front unless it is already listed.
    pub fn record_new(&self, notification: &Notification) -> bool {
        let mut state = self.state.write();
        if state.items.iter().any(|n| n.id == notification.id) {
            return false;
        }
        state.items.insert(0, notification.clone());
        state.total += 1;
        true
    }

    pub fn apply_unread_count(&self, count: u64) {
        self.state.write().unread_count = count;
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), TransportError> {
        self.optimistic(
            format!("mark-read:{id}"),
            "mark the notification as read",
            |state| state.mark_read(id),
            self.transport.mark_read(id),
        )
        .await
    }

    pub async fn mark_all_read(&self) -> Result<(), TransportError> {
        self.optimistic(
            "mark-all-read".to_string(),
            "mark all notifications as read",
            |state| state.mark_all_read(),
            self.transport.mark_all_read(),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), TransportError> {
        self.optimistic(
            format!("delete:{id}"),
            "delete the notification",
            |state| state.remove_where(|n| n.id == id),
            self.transport.delete_one(id),
        )
        .await
    }

    pub async fn clear_read(&self) -> Result<(), TransportError> {
        self.optimistic(
            "clear-read".to_string(),
            "clear read notifications",
            |state| state.remove_where(|n| n.is_read),
            self.transport.delete_all_read(),
        )
        .await
    }

    async fn optimistic<F>(
        &self,
        key: String,
        action: &str,
        mutate: F,
        request: impl Future<Output = Result<(), TransportError>>,
    ) -> Result<(), TransportError>
    where
        F: FnOnce(&mut InboxState) -> Undo,
    {
        let undo = {
            let mut state = self.state.write();
            mutate(&mut state)
        };

        match request.await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state.write().undo(undo);
                let message = if e.is_unauthenticated() {
                    "Your session has expired. Please log in again.".to_string()
                } else {
                    format!("Could not {action}: {e}")
                };
                self.alerts.notify(key, "Notification error", message);
                Err(e)
            }
        }
    }
}
