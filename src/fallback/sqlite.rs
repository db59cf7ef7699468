//! SQLite-backed fallback store (native only).

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::FallbackStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        // Set busy timeout to avoid immediate lock failures
        conn.pragma_update(None, "busy_timeout", 250)?;
        log::info!("[fallback] sqlite cache at {}", path.display());
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS fallback_cache(
                key         TEXT PRIMARY KEY,
                value       TEXT NOT NULL,
                updated_ms  INTEGER NOT NULL
            );
        "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("fallback cache connection poisoned"))
    }
}

impl FallbackStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM fallback_cache WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        // Single statement, so a key is either fully replaced or untouched.
        conn.execute(
            "INSERT OR REPLACE INTO fallback_cache(key, value, updated_ms) VALUES (?, ?, ?)",
            params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("market").unwrap(), None);

        store.set("market", r#"{"saved_at_ms":1,"items":[]}"#).unwrap();
        assert_eq!(
            store.get("market").unwrap().as_deref(),
            Some(r#"{"saved_at_ms":1,"items":[]}"#)
        );
    }

    #[test]
    fn test_set_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("leaderboard", "first").unwrap();
        store.set("leaderboard", "second").unwrap();
        assert_eq!(store.get("leaderboard").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("bloquedash-test-{}", std::process::id()));
        let path = dir.join("cache.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("market", "kept").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("market").unwrap().as_deref(), Some("kept"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
