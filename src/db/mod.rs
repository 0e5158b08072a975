use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub mod cache;
pub mod models;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored value is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database lock poisoned")]
    Poisoned,
}

/// What a stored document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Fixtures,
    Standings,
    FixtureSelections,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Fixtures => "fixtures",
            EntityKind::Standings => "standings",
            EntityKind::FixtureSelections => "fixtureSelections",
        }
    }
}

/// Key of one stored document, scoped to a league season.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub kind: EntityKind,
    pub league: String,
    pub season: u16,
}

impl StoreKey {
    pub fn new(kind: EntityKind, league: &str, season: u16) -> Self {
        StoreKey {
            kind,
            league: league.to_string(),
            season,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind.as_str(), self.league, self.season)
    }
}

/// Local JSON document store for cached fixtures and predictions.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &StoreKey) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &StoreKey, value: &Value) -> Result<(), StoreError>;
    /// When the value under `key` was last written.
    fn updated_at(&self, key: &StoreKey) -> Result<Option<DateTime<Utc>>, StoreError>;
}

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &StoreKey) -> Result<Option<Value>, StoreError> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &StoreKey, value: &Value) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at",
            params![key.to_string(), raw, Utc::now()],
        )?;
        Ok(())
    }

    fn updated_at(&self, key: &StoreKey) -> Result<Option<DateTime<Utc>>, StoreError> {
        let conn = self.lock()?;
        let ts = conn
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                params![key.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ts)
    }
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key         TEXT    PRIMARY KEY,
    value       TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL
);
"#;
