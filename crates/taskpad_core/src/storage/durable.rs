//! Durable key-value port and its implementations.
//!
//! # Responsibility
//! - Abstract the storage backend behind `read(key)` / `write(key, bytes)`.
//! - Provide a SQLite-backed store for hosts and a shared in-memory fake.
//!
//! # Invariants
//! - `SqliteDurableStore::write` is a single upsert statement, so an
//!   interrupted write never leaves a partially written value.

use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub type DurableResult<T> = Result<T, DurableError>;

/// Durable store failure.
#[derive(Debug)]
pub enum DurableError {
    Db(DbError),
    /// Backend-specific failure that has no richer type.
    Backend(String),
    /// Snapshot could not be encoded.
    Encode(String),
}

impl Display for DurableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Backend(message) => write!(f, "durable store failure: {message}"),
            Self::Encode(message) => write!(f, "snapshot encode failure: {message}"),
        }
    }
}

impl Error for DurableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Backend(_) | Self::Encode(_) => None,
        }
    }
}

impl From<DbError> for DurableError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for DurableError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key-value persistence backend.
pub trait DurableStore {
    /// Returns the stored bytes, or `None` when the key was never written.
    fn read(&self, key: &str) -> DurableResult<Option<Vec<u8>>>;
    /// Replaces the value stored under `key`.
    fn write(&self, key: &str, bytes: &[u8]) -> DurableResult<()>;
}

/// SQLite-backed durable store over the `snapshots` table.
pub struct SqliteDurableStore {
    conn: Connection,
}

impl SqliteDurableStore {
    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps a connection already returned by [`open_db`].
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DurableStore for SqliteDurableStore {
    fn read(&self, key: &str) -> DurableResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM snapshots WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&self, key: &str, bytes: &[u8]) -> DurableResult<()> {
        self.conn.execute(
            "INSERT INTO snapshots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, bytes],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, Vec<u8>>,
    fail_writes: bool,
    write_count: usize,
}

/// In-memory durable store; clones share the same entries.
///
/// Writes can be forced to fail to exercise persistence-error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryDurableStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or overwrites a raw value without counting it as a write.
    pub fn put(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.lock().entries.insert(key.to_string(), bytes.into());
    }

    /// Returns the raw stored value.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().entries.get(key).cloned()
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.lock().write_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DurableStore for MemoryDurableStore {
    fn read(&self, key: &str) -> DurableResult<Option<Vec<u8>>> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, bytes: &[u8]) -> DurableResult<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(DurableError::Backend(format!(
                "injected write failure for key `{key}`"
            )));
        }
        state.entries.insert(key.to_string(), bytes.to_vec());
        state.write_count += 1;
        Ok(())
    }
}
