use super::SubscriberRegistry;
use crate::domain::{ClientConfig, ListParams, Notification, NotificationSource};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSettings {
    pub notification_interval: Duration,
    pub unread_interval: Duration,
    pub recent_limit: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            notification_interval: Duration::from_secs(10),
            unread_interval: Duration::from_secs(5),
            recent_limit: 5,
        }
    }
}

impl From<&ClientConfig> for PollSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            notification_interval: config.poll_interval(),
            unread_interval: config.unread_interval(),
            recent_limit: config.recent_limit,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Number of items handed to subscribers; an unread count counts as one.
    Delivered(usize),
    Failed,
    /// The poller was stopped or restarted while the request was in flight.
    Stale,
}

struct TimerPair {
    notifications: JoinHandle<()>,
    unread: JoinHandle<()>,
}

impl TimerPair {
    fn abort(self) {
        self.notifications.abort();
        self.unread.abort();
    }
}

struct PollingState {
    timers: Option<TimerPair>,
    last_check: DateTime<Utc>,
    generation: u64,
}

struct PollerInner {
    rt_handle: tokio::runtime::Handle,
    source: Arc<dyn NotificationSource>,
    registry: Arc<SubscriberRegistry>,
    settings: PollSettings,
    state: Mutex<PollingState>,
}

impl PollerInner {
    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }

    async fn check_new_notifications(&self, issued: u64) -> CheckOutcome {
        let params = ListParams::recent_unread(self.settings.recent_limit);
        let page = match self.source.list(params).await {
            Ok(page) => page,
            Err(_) if !self.is_current(issued) => return CheckOutcome::Stale,
            Err(e) => {
                log::warn!("Failed to check for new notifications: {e}");
                return CheckOutcome::Failed;
            }
        };

        let fresh: Vec<Notification> = {
            let mut state = self.state.lock();
            if state.generation != issued {
                return CheckOutcome::Stale;
            }

            let watermark = state.last_check;
            let mut seen = HashSet::new();
            let fresh: Vec<Notification> = page
                .data
                .into_iter()
                .filter(|n| n.is_newer_than(watermark))
                .filter(|n| seen.insert(n.id.clone()))
                .collect();

            if !fresh.is_empty() {
                state.last_check = state.last_check.max(Utc::now());
            }
            fresh
        };

        if !fresh.is_empty() {
            log::debug!("Delivering {} new notification(s)", fresh.len());
        }
        for (delivered, notification) in fresh.iter().enumerate() {
            if !self.is_current(issued) {
                log::debug!("Polling stopped mid-delivery after {delivered} notification(s)");
                return if delivered == 0 {
                    CheckOutcome::Stale
                } else {
                    CheckOutcome::Delivered(delivered)
                };
            }
            self.registry.emit_new_notification(notification);
        }
        CheckOutcome::Delivered(fresh.len())
    }

    async fn check_unread_count(&self, issued: u64) -> CheckOutcome {
        let count = match self.source.unread_count().await {
            Ok(count) => count,
            Err(_) if !self.is_current(issued) => return CheckOutcome::Stale,
            Err(e) => {
                log::warn!("Failed to check unread count: {e}");
                return CheckOutcome::Failed;
            }
        };

        if !self.is_current(issued) {
            return CheckOutcome::Stale;
        }
        self.registry.emit_unread_count(count);
        CheckOutcome::Delivered(1)
    }
}

impl Drop for PollerInner {
    fn drop(&mut self) {
        if let Some(timers) = self.state.get_mut().timers.take() {
            timers.abort();
        }
    }
}

#[derive(Clone, Copy)]
enum TimerKind {
    NewNotifications,
    UnreadCount,
}

/// Keeps notification state fresh on two independent timers.
///
/// Cloning is cheap; every clone drives the same timers. Timers stop on
/// `stop()` or when the last clone is dropped.
///
/// Results are checked against the current generation right before each
/// subscriber fan-out. A `stop()` issued from another thread while a
/// fan-out is already running does not interrupt that one emission.
/// `last_check` keeps whatever it advanced to, since it never moves back.
#[derive(Clone)]
pub struct NotificationPoller {
    inner: Arc<PollerInner>,
}

impl NotificationPoller {
    pub fn new(
        rt_handle: tokio::runtime::Handle,
        source: Arc<dyn NotificationSource>,
        registry: Arc<SubscriberRegistry>,
        settings: PollSettings,
    ) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                rt_handle,
                source,
                registry,
                settings,
                state: Mutex::new(PollingState {
                    timers: None,
                    last_check: Utc::now(),
                    generation: 0,
                }),
            }),
        }
    }

    pub fn with_last_check(self, last_check: DateTime<Utc>) -> Self {
        self.inner.state.lock().last_check = last_check;
        self
    }

    pub fn registry(&self) -> &Arc<SubscriberRegistry> {
        &self.inner.registry
    }

    /// Replaces any running timer pair; both checks fire immediately.
    pub fn start(&self, interval: Duration) {
        let mut state = self.inner.state.lock();
        if let Some(timers) = state.timers.take() {
            timers.abort();
        }
        state.generation += 1;
        let generation = state.generation;

        let weak = Arc::downgrade(&self.inner);
        let notifications = self.inner.rt_handle.spawn(run_timer(
            weak.clone(),
            TimerKind::NewNotifications,
            interval,
            generation,
        ));
        let unread = self.inner.rt_handle.spawn(run_timer(
            weak,
            TimerKind::UnreadCount,
            self.inner.settings.unread_interval,
            generation,
        ));

        state.timers = Some(TimerPair {
            notifications,
            unread,
        });
        log::debug!("Notification polling started (every {interval:?})");
    }

    pub fn start_default(&self) {
        self.start(self.inner.settings.notification_interval);
    }

    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        state.generation += 1;
        if let Some(timers) = state.timers.take() {
            timers.abort();
            log::debug!("Notification polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().timers.is_some()
    }

    pub fn last_check(&self) -> DateTime<Utc> {
        self.inner.state.lock().last_check
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    /// Runs one new-notification cycle outside the timers.
    pub async fn check_new_notifications(&self) -> CheckOutcome {
        let issued = self.generation();
        self.inner.check_new_notifications(issued).await
    }

    /// Runs one unread-count cycle outside the timers.
    pub async fn check_unread_count(&self) -> CheckOutcome {
        let issued = self.generation();
        self.inner.check_unread_count(issued).await
    }
}

async fn run_timer(poller: Weak<PollerInner>, kind: TimerKind, period: Duration, generation: u64) {
    let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(inner) = poller.upgrade() else {
            break;
        };
        match kind {
            TimerKind::NewNotifications => inner.check_new_notifications(generation).await,
            TimerKind::UnreadCount => inner.check_unread_count(generation).await,
        };
    }
}
