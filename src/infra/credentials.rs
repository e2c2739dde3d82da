use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize)]
struct StoredCredentials {
    token: String,
}

/// Bearer token persisted next to the config and cached in memory.
pub struct CredentialStore {
    path: Option<PathBuf>,
    token: RwLock<Option<String>>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            token: RwLock::new(None),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            token: RwLock::new(None),
        }
    }

    pub async fn load(&self) -> anyhow::Result<Option<String>> {
        let Some(path) = &self.path else {
            return Ok(self.token());
        };
        if !path.exists() {
            *self.token.write() = None;
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(path).await?;
        let stored: StoredCredentials = toml::from_str(&content)?;
        let token = Some(stored.token).filter(|t| !t.trim().is_empty());
        *self.token.write() = token.clone();
        Ok(token)
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    pub async fn save(&self, token: String) -> anyhow::Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let toml_str = toml::to_string_pretty(&StoredCredentials {
                token: token.clone(),
            })?;
            tokio::fs::write(path, toml_str).await?;
        }
        *self.token.write() = Some(token);
        Ok(())
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        *self.token.write() = None;
        if let Some(path) = &self.path
            && path.exists()
        {
            tokio::fs::remove_file(path).await?;
        }
        Ok(())
    }
}
