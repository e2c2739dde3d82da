use crate::domain::Notification;
use parking_lot::RwLock;
use std::sync::Arc;

pub type NotificationCallback = Arc<dyn Fn(&Notification) + Send + Sync>;
pub type UnreadCountCallback = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    NewNotification,
    UnreadCount,
}

/// Handle returned by the `on_*` methods; pass it to `unsubscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: SubscriptionKind,
    id: u64,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    new_notification: Vec<(u64, NotificationCallback)>,
    unread_count: Vec<(u64, UnreadCountCallback)>,
}

#[derive(Default)]
pub struct SubscriberRegistry {
    inner: RwLock<RegistryInner>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_new_notification<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.new_notification.push((id, Arc::new(callback)));
        Subscription {
            kind: SubscriptionKind::NewNotification,
            id,
        }
    }

    pub fn on_unread_count_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.unread_count.push((id, Arc::new(callback)));
        Subscription {
            kind: SubscriptionKind::UnreadCount,
            id,
        }
    }

    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut inner = self.inner.write();
        match subscription.kind {
            SubscriptionKind::NewNotification => {
                let before = inner.new_notification.len();
                inner.new_notification.retain(|(id, _)| *id != subscription.id);
                inner.new_notification.len() != before
            }
            SubscriptionKind::UnreadCount => {
                let before = inner.unread_count.len();
                inner.unread_count.retain(|(id, _)| *id != subscription.id);
                inner.unread_count.len() != before
            }
        }
    }

    pub fn remove_all_listeners(&self) {
        let mut inner = self.inner.write();
        inner.new_notification.clear();
        inner.unread_count.clear();
    }

    pub fn listener_count(&self, kind: SubscriptionKind) -> usize {
        let inner = self.inner.read();
        match kind {
            SubscriptionKind::NewNotification => inner.new_notification.len(),
            SubscriptionKind::UnreadCount => inner.unread_count.len(),
        }
    }

    // Callbacks run after the lock is released so they may (un)subscribe.
    pub fn emit_new_notification(&self, notification: &Notification) {
        let callbacks: Vec<NotificationCallback> = self
            .inner
            .read()
            .new_notification
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(notification);
        }
    }

    pub fn emit_unread_count(&self, count: u64) {
        let callbacks: Vec<UnreadCountCallback> = self
            .inner
            .read()
            .unread_count
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(count);
        }
    }
}
