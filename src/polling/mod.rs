mod registry;
mod scheduler;

pub use registry::{
    NotificationCallback, SubscriberRegistry, Subscription, SubscriptionKind, UnreadCountCallback,
};
pub use scheduler::{CheckOutcome, NotificationPoller, PollSettings};
