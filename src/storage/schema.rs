//! Database schema definitions
//!
//! The unique index backing upserts depends on the configured
//! `ConflictKey`; only the index of the active key exists at a time.

use crate::storage::ConflictKey;
use rusqlite::Connection;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Normalized listings from every marketplace
CREATE TABLE IF NOT EXISTS listings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    asking_price INTEGER NOT NULL DEFAULT 0
        CHECK (asking_price BETWEEN 0 AND 2147483647),
    annual_revenue INTEGER NOT NULL DEFAULT 0
        CHECK (annual_revenue BETWEEN 0 AND 2147483647),
    industry TEXT NOT NULL,
    location TEXT NOT NULL,
    source TEXT NOT NULL,
    highlights TEXT NOT NULL DEFAULT '[]',
    image_url TEXT,
    original_url TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'active',
    scraped_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_listings_source ON listings(source);
CREATE INDEX IF NOT EXISTS idx_listings_industry ON listings(industry);

-- One row per orchestration run
CREATE TABLE IF NOT EXISTS scraping_sessions (
    id TEXT PRIMARY KEY,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    status TEXT NOT NULL,
    outcome TEXT,
    total_listings INTEGER NOT NULL DEFAULT 0,
    sources TEXT NOT NULL DEFAULT '[]',
    errors TEXT NOT NULL DEFAULT '[]',
    config_hash TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_started ON scraping_sessions(started_at);
"#;

/// Initializes the schema and the unique index for `key`
///
/// # Errors
///
/// Fails if existing rows violate the uniqueness of `key`, which happens
/// when switching to the coarser legacy key on a store holding listings
/// that only differ by URL.
pub fn initialize_schema(conn: &Connection, key: ConflictKey) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Create before dropping, so a failed switch keeps the previous index
    conn.execute_batch(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON listings({});",
        key.index_name(),
        key.columns()
    ))?;

    for other in ConflictKey::ALL.iter().filter(|k| **k != key) {
        conn.execute_batch(&format!("DROP INDEX IF EXISTS {};", other.index_name()))?;
    }

    Ok(())
}
