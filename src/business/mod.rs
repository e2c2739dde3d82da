mod alerts;
mod inbox;

pub use alerts::{Alert, SharedAlertBoard};
pub use inbox::Inbox;
