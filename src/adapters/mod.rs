pub mod rest;

pub use rest::RestNotificationSource;
