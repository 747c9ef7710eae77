use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use super::config::{Config, SecretSource};

/// Credentials resolved for the relational store.
///
/// The shape matches the managed vault payload. With the embedded engine
/// only `dbname` selects anything locally; the remaining fields are kept so
/// both providers return the same contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbCredentials {
    pub username: String,
    pub password: String,
    pub host: String,
    pub dbname: String,
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read credentials file: {0}")]
    Io(#[from] std::io::Error),
    #[error("vault request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed credentials payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source of store credentials, selected once at startup.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn resolve(&self) -> Result<DbCredentials, SecretError>;
}

/// Reads credentials from a local JSON file.
pub struct FileSecretProvider {
    path: PathBuf,
}

impl FileSecretProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretProvider for FileSecretProvider {
    async fn resolve(&self) -> Result<DbCredentials, SecretError> {
        let raw = fs::read_to_string(&self.path).await?;
        let creds: DbCredentials = serde_json::from_str(&raw)?;
        info!(path = %self.path.display(), "Loaded store credentials from file");
        Ok(creds)
    }
}

/// Fetches credentials from a managed vault over HTTP.
pub struct VaultSecretProvider {
    client: reqwest::Client,
    url: String,
}

impl VaultSecretProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SecretProvider for VaultSecretProvider {
    async fn resolve(&self) -> Result<DbCredentials, SecretError> {
        let creds = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<DbCredentials>()
            .await?;
        info!(url = %self.url, "Loaded store credentials from vault");
        Ok(creds)
    }
}

/// Pick the provider the configuration asks for.
pub fn from_config(config: &Config) -> Box<dyn SecretProvider> {
    match config.secret_source {
        SecretSource::Vault => Box::new(VaultSecretProvider::new(config.vault_url.clone())),
        SecretSource::Local => Box::new(FileSecretProvider::new(config.secrets_file.clone())),
    }
}
