//! Database layer for the SMRM store.
//!
//! [`store`](self) holds the collection-generic adapter; the per-entity files
//! add typed repository operations and cascade rules on top of it.

mod customers;
mod media;
mod records;
mod schema;
mod settings;
mod store;

pub use schema::*;
pub use settings::*;
pub use store::*;

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;
use tracing::{debug, info};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] rusqlite::Error),

    #[error("Duplicate key in {collection}: {key}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },

    #[error("Transaction error: {0}")]
    Transaction(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown index {index} on {collection}")]
    UnknownIndex {
        collection: &'static str,
        index: String,
    },

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(DbError::StorageUnavailable)?;
        let db = Self { conn };
        db.initialize()?;
        info!(path = %path.display(), "Opened SMRM database");
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(DbError::StorageUnavailable)?;
        let db = Self { conn };
        db.initialize()?;
        debug!("Opened in-memory SMRM database");
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(DbError::StorageUnavailable)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside one transaction; any error rolls everything back.
    pub(crate) fn atomically<T>(&self, f: impl FnOnce(&Self) -> DbResult<T>) -> DbResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Remove every customer, record, media item and setting.
    pub fn delete_all_data(&self) -> DbResult<()> {
        self.atomically(|db| {
            for collection in Collection::ALL {
                db.clear(collection)?;
            }
            Ok(())
        })?;
        info!("Deleted all data");
        Ok(())
    }
}
