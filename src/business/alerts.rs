use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum AlertState {
    Active,
    Dismissed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub uid: u64,
    pub key: String,
    pub title: String,
    pub message: String,
}

struct ActiveAlert {
    alert: Alert,
    elapsed: Duration,
    state: AlertState,
}

struct AlertBoardInner {
    queue: Vec<ActiveAlert>,
    max_duration: Duration,
    next_id: u64,
}

/// User-facing error toasts, de-duplicated by key while one is showing.
#[derive(Clone)]
pub struct SharedAlertBoard(Arc<RwLock<AlertBoardInner>>);

impl Default for SharedAlertBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedAlertBoard {
    pub fn new() -> Self {
        Self::with_max_duration(Duration::from_secs(8))
    }

    pub fn with_max_duration(max_duration: Duration) -> Self {
        Self(Arc::new(RwLock::new(AlertBoardInner {
            queue: Vec::new(),
            max_duration,
            next_id: 0,
        })))
    }

    /// Returns `None` if an alert with the same key is still active.
    pub fn notify(
        &self,
        key: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Option<u64> {
        let key = key.into();
        let mut inner = self.0.write();
        if inner
            .queue
            .iter()
            .any(|item| item.state == AlertState::Active && item.alert.key == key)
        {
            log::debug!("Alert '{key}' already showing");
            return None;
        }

        let uid = inner.next_id;
        inner.next_id += 1;
        inner.queue.push(ActiveAlert {
            alert: Alert {
                uid,
                key,
                title: title.into(),
                message: message.into(),
            },
            elapsed: Duration::ZERO,
            state: AlertState::Active,
        });
        Some(uid)
    }

    /// Ages the front alert; the ones behind it wait their turn.
    pub fn advance(&self, dt: Duration) {
        let mut inner = self.0.write();
        let max_duration = inner.max_duration;

        if let Some(front) = inner
            .queue
            .iter_mut()
            .find(|item| item.state == AlertState::Active)
        {
            front.elapsed += dt;
            if front.elapsed >= max_duration {
                front.state = AlertState::Dismissed;
            }
        }

        inner.queue.retain(|item| item.state == AlertState::Active);
    }

    pub fn dismiss(&self, uid: u64) -> bool {
        let mut inner = self.0.write();
        let before = inner.queue.len();
        inner.queue.retain(|item| item.alert.uid != uid);
        inner.queue.len() != before
    }

    pub fn active(&self) -> Vec<Alert> {
        self.0
            .read()
            .queue
            .iter()
            .filter(|item| item.state == AlertState::Active)
            .map(|item| item.alert.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_is_not_shown_twice() {
        let board = SharedAlertBoard::new();
        assert!(board.notify("mark-read:n1", "Error", "first").is_some());
        assert!(board.notify("mark-read:n1", "Error", "second").is_none());
        assert!(board.notify("delete:n1", "Error", "other").is_some());

        let active = board.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].message, "first");
    }

    #[test]
    fn test_key_is_reusable_after_expiry() {
        let board = SharedAlertBoard::with_max_duration(Duration::from_secs(2));
        board.notify("k", "Error", "boom");

        board.advance(Duration::from_secs(1));
        assert_eq!(board.active().len(), 1);
        board.advance(Duration::from_secs(1));
        assert!(board.is_empty());

        assert!(board.notify("k", "Error", "boom again").is_some());
    }

    #[test]
    fn test_only_front_alert_ages() {
        let board = SharedAlertBoard::with_max_duration(Duration::from_secs(3));
        board.notify("a", "Error", "a");
        board.notify("b", "Error", "b");

        board.advance(Duration::from_secs(3));
        let active = board.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].key, "b");
    }

    #[test]
    fn test_dismiss_by_uid() {
        let board = SharedAlertBoard::new();
        let uid = board.notify("a", "Error", "a").unwrap();
        assert!(board.dismiss(uid));
        assert!(!board.dismiss(uid));
        assert!(board.notify("a", "Error", "a").is_some());
    }
}
