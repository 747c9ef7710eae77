//! Environment-driven configuration.
//!
//! All settings are read once at startup. The only required decision is
//! which secret source to use: `TASKBOARD_ENV=vault` selects the managed
//! vault, anything else (or nothing) the local credentials file.

use std::env;
use std::path::PathBuf;

use anyhow::Result;

use super::data_storage::DataStorage;

/// Default name of the local credentials file under the data directory.
pub const SECRETS_FILE_NAME: &str = "secrets.json";

/// Default listener port, matching the deployment's fixed port.
pub const DEFAULT_PORT: u16 = 8080;

/// Where store credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    /// JSON file on local disk (development default).
    Local,
    /// Managed vault reached over HTTP.
    Vault,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_source: SecretSource,
    /// Path of the local credentials file (`Local` source).
    pub secrets_file: PathBuf,
    /// Vault endpoint returning the credential JSON (`Vault` source).
    pub vault_url: String,
    pub bind: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let secret_source = match env::var("TASKBOARD_ENV") {
            Ok(value) if value.eq_ignore_ascii_case("vault") => SecretSource::Vault,
            _ => SecretSource::Local,
        };
        let secrets_file = match env::var("TASKBOARD_SECRETS_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => DataStorage::new().get_path(SECRETS_FILE_NAME)?,
        };
        let vault_url = env::var("TASKBOARD_VAULT_URL").unwrap_or_default();
        let bind = env::var("BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            secret_source,
            secrets_file,
            vault_url,
            bind,
            port,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
