//! Session bearer-token cache backed by durable client-local storage.
//!
//! # Responsibility
//! - Hold the current bearer token for the session.
//! - Persist it under one local key so a restart does not force re-login.
//!
//! # Invariants
//! - The persistent key is read once, when the cache is constructed.
//! - `set`/`clear` write storage first; memory only changes on success.
//! - No expiry logic: freshness is the caller's concern.

use crate::db::{open_db, open_db_in_memory, DbError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

/// Persistent local key holding the last bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

pub type TokenCacheResult<T> = Result<T, TokenCacheError>;

#[derive(Debug)]
pub enum TokenCacheError {
    Db(DbError),
    /// A lock was poisoned by a panicking writer.
    Poisoned(&'static str),
}

impl Display for TokenCacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Poisoned(what) => write!(f, "token cache lock poisoned: {what}"),
        }
    }
}

impl Error for TokenCacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Poisoned(_) => None,
        }
    }
}

impl From<DbError> for TokenCacheError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TokenCacheError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key/value storage for client-local session state.
pub trait TokenStorage {
    fn load(&self, key: &str) -> TokenCacheResult<Option<String>>;
    fn store(&self, key: &str, value: &str) -> TokenCacheResult<()>;
    fn remove(&self, key: &str) -> TokenCacheResult<()>;
}

/// SQLite-backed storage over the `session_kv` table.
pub struct SqliteTokenStorage {
    conn: Mutex<Connection>,
}

impl SqliteTokenStorage {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> TokenCacheResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn in_memory() -> TokenCacheResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&Connection) -> TokenCacheResult<T>,
    ) -> TokenCacheResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| TokenCacheError::Poisoned("sqlite connection"))?;
        op(&conn)
    }
}

impl TokenStorage for SqliteTokenStorage {
    fn load(&self, key: &str) -> TokenCacheResult<Option<String>> {
        self.with_conn(|conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM session_kv WHERE key = ?1;",
                    [key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    fn store(&self, key: &str, value: &str) -> TokenCacheResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO session_kv (key, value, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> TokenCacheResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM session_kv WHERE key = ?1;", [key])?;
            Ok(())
        })
    }
}

/// Process-local storage for tests and configurations without a db path.
#[derive(Default)]
pub struct MemoryTokenStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self, key: &str) -> TokenCacheResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| TokenCacheError::Poisoned("memory storage"))?;
        Ok(values.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> TokenCacheResult<()> {
        self.values
            .lock()
            .map_err(|_| TokenCacheError::Poisoned("memory storage"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> TokenCacheResult<()> {
        self.values
            .lock()
            .map_err(|_| TokenCacheError::Poisoned("memory storage"))?
            .remove(key);
        Ok(())
    }
}

impl<S: TokenStorage + ?Sized> TokenStorage for Arc<S> {
    fn load(&self, key: &str) -> TokenCacheResult<Option<String>> {
        (**self).load(key)
    }

    fn store(&self, key: &str, value: &str) -> TokenCacheResult<()> {
        (**self).store(key, value)
    }

    fn remove(&self, key: &str) -> TokenCacheResult<()> {
        (**self).remove(key)
    }
}

/// Read-only token seam borrowed by the domain store per remote call.
pub trait TokenSource {
    fn bearer_token(&self) -> Option<String>;
}

impl<T: TokenSource + ?Sized> TokenSource for Arc<T> {
    fn bearer_token(&self) -> Option<String> {
        (**self).bearer_token()
    }
}

/// Holder of the current session bearer token.
pub struct SessionTokenCache<S: TokenStorage> {
    storage: S,
    current: RwLock<Option<String>>,
}

impl<S: TokenStorage> SessionTokenCache<S> {
    /// Creates the cache and restores the persisted token, if any.
    pub fn load(storage: S) -> TokenCacheResult<Self> {
        let restored = storage.load(AUTH_TOKEN_KEY)?;
        info!(
            "event=token_restore module=auth status=ok restored={}",
            restored.is_some()
        );
        Ok(Self {
            storage,
            current: RwLock::new(restored),
        })
    }

    /// Returns the current token; `None` if never set or after `clear`.
    pub fn get(&self) -> Option<String> {
        match self.current.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the current token and persists it.
    pub fn set(&self, token: impl Into<String>) -> TokenCacheResult<()> {
        let token = token.into();
        if let Err(err) = self.storage.store(AUTH_TOKEN_KEY, &token) {
            error!(
                "event=token_set module=auth status=error error_code=storage_write_failed error={}",
                err
            );
            return Err(err);
        }
        *self
            .current
            .write()
            .map_err(|_| TokenCacheError::Poisoned("current token"))? = Some(token);
        info!("event=token_set module=auth status=ok");
        Ok(())
    }

    /// Drops the current token from memory and storage.
    pub fn clear(&self) -> TokenCacheResult<()> {
        if let Err(err) = self.storage.remove(AUTH_TOKEN_KEY) {
            error!(
                "event=token_clear module=auth status=error error_code=storage_remove_failed error={}",
                err
            );
            return Err(err);
        }
        *self
            .current
            .write()
            .map_err(|_| TokenCacheError::Poisoned("current token"))? = None;
        info!("event=token_clear module=auth status=ok");
        Ok(())
    }
}

impl<S: TokenStorage> TokenSource for SessionTokenCache<S> {
    fn bearer_token(&self) -> Option<String> {
        self.get()
    }
}
