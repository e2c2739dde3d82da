mod config_manager;
mod credentials;
mod transport;

pub use config_manager::ConfigManager;
pub use credentials::CredentialStore;
pub use transport::NotificationTransport;
