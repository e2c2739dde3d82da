use crate::domain::ClientConfig;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.toml";
const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn default_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("etuition-notify"))
    }

    /// Creates the directory and writes a default config on first run.
    pub async fn init(&self) -> anyhow::Result<ClientConfig> {
        self.ensure_dirs().await?;
        if !self.config_exists() {
            return self.create_default_config().await;
        }
        self.load_config().await
    }

    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.config_dir).await?;
        Ok(())
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.config_dir.join(CREDENTIALS_FILE)
    }

    // Config operations
    pub fn config_exists(&self) -> bool {
        self.config_dir.join(CONFIG_FILE).exists()
    }

    pub async fn load_config(&self) -> anyhow::Result<ClientConfig> {
        let path = self.config_dir.join(CONFIG_FILE);
        let content = tokio::fs::read_to_string(path).await?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub async fn save_config(&self, config: &ClientConfig) -> anyhow::Result<()> {
        let path = self.config_dir.join(CONFIG_FILE);
        let toml_str = toml::to_string_pretty(config)?;
        tokio::fs::write(path, toml_str).await?;
        Ok(())
    }

    pub async fn create_default_config(&self) -> anyhow::Result<ClientConfig> {
        let config = ClientConfig::default();
        self.save_config(&config).await?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_writes_default_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("etuition-notify"));

        let first = manager.init().await.unwrap();
        assert!(manager.config_exists());
        assert_eq!(first, ClientConfig::default());

        let mut changed = first.clone();
        changed.base_url = "https://api.etuitionbd.test".to_string();
        manager.save_config(&changed).await.unwrap();

        let second = manager.init().await.unwrap();
        assert_eq!(second.base_url, "https://api.etuitionbd.test");
    }

    #[tokio::test]
    async fn test_partial_config_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        tokio::fs::write(dir.path().join(CONFIG_FILE), "poll_interval_ms = 2500\n")
            .await
            .unwrap();

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.poll_interval_ms, 2500);
        assert_eq!(config.unread_interval_ms, 5000);
        assert_eq!(config.recent_limit, 5);
    }
}
