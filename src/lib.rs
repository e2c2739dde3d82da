//! Notification client for the eTuitionBD tutoring marketplace.
//!
//! [`adapters::RestNotificationSource`] talks to the REST backend,
//! [`polling::NotificationPoller`] keeps unread counts and new notifications
//! fresh on two timers, and [`business::Inbox`] holds the local page that
//! presentation code renders.

pub mod adapters;
pub mod business;
pub mod domain;
pub mod infra;
pub mod polling;

#[cfg(test)]
pub(crate) mod test_support;
