//! Storage medium for save blobs.
//!
//! RULE: The engine only sees `KvStorage`. SQL lives in `SqliteStorage`.

use crate::error::{GameError, GameResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::collections::BTreeMap;

pub trait KvStorage {
    fn get(&self, key: &str) -> GameResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> GameResult<()>;
    fn remove(&mut self, key: &str) -> GameResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> GameResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> GameResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Save slots in a `save_slot` table.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Used in tests.
    pub fn in_memory() -> GameResult<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn migrate(&self) -> GameResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_save_slot.sql"))?;
        Ok(())
    }

    /// When `key` was last written.
    pub fn updated_at(&self, key: &str) -> GameResult<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT updated_at FROM save_slot WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| GameError::Other(anyhow::anyhow!("Bad timestamp for {key}: {e}")))
        })
        .transpose()
    }
}

impl KvStorage for SqliteStorage {
    fn get(&self, key: &str) -> GameResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM save_slot WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> GameResult<()> {
        self.conn.execute("DELETE FROM save_slot WHERE key = ?1", params![key])?;
        Ok(())
    }
}
