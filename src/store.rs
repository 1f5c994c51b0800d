// 💾 Key/Value Store - the one persisted bit of state
//
// Only the "welcome screen already shown" flag is persisted. It is read once
// when an interactive session starts and written once.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Minimal string key/value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// ============================================================================
// SQLITE
// ============================================================================

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open state database: {}", path.display()))?;
        info!(path = %path.display(), "Opened state database");
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_store(&conn)?;
        Ok(SqliteStore { conn })
    }
}

pub fn setup_store(conn: &Connection) -> Result<()> {
    // WAL for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create kv table")?;

    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .with_context(|| format!("Failed to read key {}", key))?;
        debug!(key, found = value.is_some(), "kv get");
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .with_context(|| format!("Failed to write key {}", key))?;
        debug!(key, "kv set");
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Non-persistent store, used when no state database is wanted
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// WELCOME FLAG
// ============================================================================

pub struct WelcomeFlag {
    key: String,
}

impl WelcomeFlag {
    pub fn new(app_id: &str) -> Self {
        WelcomeFlag {
            key: format!("{}-visited", app_id),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_set(&self, store: &dyn KeyValueStore) -> Result<bool> {
        Ok(store.get(&self.key)?.as_deref() == Some("true"))
    }

    /// Returns true when the welcome screen should be shown, marking it as seen.
    pub fn check_and_mark(&self, store: &mut dyn KeyValueStore) -> Result<bool> {
        if self.is_set(store)? {
            return Ok(false);
        }
        store.set(&self.key, "true")?;
        info!(key = %self.key, "First visit recorded");
        Ok(true)
    }
}
