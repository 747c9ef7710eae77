use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

use crate::libs::data_storage::DataStorage;
use crate::libs::secret::DbCredentials;

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Open the store selected by the resolved credentials.
    ///
    /// The embedded engine keeps one database file per `dbname` under the
    /// platform data directory.
    pub fn open(creds: &DbCredentials) -> Result<Db> {
        let file_name = format!("{}.db", creds.dbname);
        let db_file_path = DataStorage::new().get_path(&file_name)?;
        Self::open_at(&db_file_path)
    }

    pub fn open_at(path: &Path) -> Result<Db> {
        let conn: Connection = Connection::open(path)?;
        info!(path = %path.display(), "Opened task store");
        Ok(Db { conn })
    }

    /// Disposable in-memory store, used as the fallback when the configured
    /// store cannot be opened. Contents vanish with the process.
    pub fn open_in_memory() -> Result<Db> {
        let conn = Connection::open_in_memory()?;
        Ok(Db { conn })
    }
}
