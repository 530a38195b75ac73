//! SQLite persistence for channels and tags
//!
//! A single bundled-SQLite connection behind a mutex; queries are short and
//! the webserver load is interactive, so one connection is enough.

pub mod models;

mod channels;
mod tags;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::logger::{self, LogTag};

/// Shared database handle
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create database directory {}", dir.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        logger::info(
            LogTag::Database,
            &format!("database ready at {}", path.display()),
        );
        Ok(db)
    }

    /// In-memory database for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL
            );
            CREATE TABLE IF NOT EXISTS channels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                default_title TEXT NOT NULL DEFAULT ''
            );
            CREATE TABLE IF NOT EXISTS channel_tag (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                channel_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_channel_tag_channel ON channel_tag(channel_id);
            CREATE INDEX IF NOT EXISTS idx_channel_tag_tag ON channel_tag(tag_id);",
        )
        .context("database migration failed")?;
        Ok(())
    }
}

/// Parse a GROUP_CONCAT id list ("3,1,7") into ids; NULL becomes empty.
pub(crate) fn parse_id_list(concat: Option<String>) -> Vec<i64> {
    concat
        .map(|s| {
            s.split(',')
                .filter_map(|part| part.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}
