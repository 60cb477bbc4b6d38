//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ListingStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingStore, StorageResult};
use crate::storage::{now_rfc3339, ConflictKey, ListingRow, SessionRecord, StoredListing};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const LISTING_COLUMNS: &str = "id, name, description, asking_price, annual_revenue, industry, \
     location, source, highlights, image_url, original_url, status, scraped_at, updated_at";

const SESSION_COLUMNS: &str =
    "id, started_at, finished_at, status, outcome, total_listings, sources, errors, config_hash";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    key: ConflictKey,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `key` - Conflict key for listing upserts
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path, key: ConflictKey) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn, key)?;

        Ok(Self { conn, key })
    }

    /// Creates an in-memory database
    pub fn new_in_memory(key: ConflictKey) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn, key)?;
        Ok(Self { conn, key })
    }

    fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO listings (name, description, asking_price, annual_revenue, industry,
                 location, source, highlights, image_url, original_url, status, scraped_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT({}) DO UPDATE SET
                 description = excluded.description,
                 asking_price = excluded.asking_price,
                 annual_revenue = excluded.annual_revenue,
                 industry = excluded.industry,
                 location = excluded.location,
                 highlights = excluded.highlights,
                 image_url = excluded.image_url,
                 original_url = excluded.original_url,
                 status = excluded.status,
                 scraped_at = excluded.scraped_at,
                 updated_at = excluded.updated_at",
            self.key.columns()
        )
    }
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<StoredListing> {
    let highlights: String = row.get(8)?;
    let original_url: String = row.get(10)?;

    Ok(StoredListing {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        asking_price: row.get::<_, i64>(3)?.max(0) as u64,
        annual_revenue: row.get::<_, i64>(4)?.max(0) as u64,
        industry: row.get(5)?,
        location: row.get(6)?,
        source: row.get(7)?,
        highlights: serde_json::from_str(&highlights).unwrap_or_default(),
        image_url: row.get(9)?,
        original_url: (!original_url.is_empty()).then_some(original_url),
        status: row.get(11)?,
        scraped_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let sources: String = row.get(6)?;
    let errors: String = row.get(7)?;

    Ok(SessionRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        status: row.get(3)?,
        outcome: row.get(4)?,
        total_listings: row.get::<_, i64>(5)?.max(0) as u64,
        sources: serde_json::from_str(&sources).unwrap_or_default(),
        errors: serde_json::from_str(&errors).unwrap_or_default(),
        config_hash: row.get(8)?,
    })
}

fn counts(conn: &Connection, sql: &str) -> StorageResult<Vec<(String, u64)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?.max(0) as u64))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl ListingStore for SqliteStorage {
    fn conflict_key(&self) -> ConflictKey {
        self.key
    }

    // ===== Listings =====

    fn upsert_listings(&mut self, rows: &[ListingRow]) -> StorageResult<usize> {
        let sql = self.upsert_sql();
        let now = now_rfc3339();
        let tx = self.conn.transaction()?;

        let mut written = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                written += stmt.execute(params![
                    row.name,
                    row.description,
                    row.asking_price,
                    row.annual_revenue,
                    row.industry,
                    row.location,
                    row.source,
                    row.highlights,
                    row.image_url,
                    row.original_url,
                    row.status,
                    row.scraped_at,
                    now,
                ])?;
            }
        }

        tx.commit()?;
        Ok(written)
    }

    fn get_listing(
        &self,
        name: &str,
        source: &str,
        original_url: Option<&str>,
    ) -> StorageResult<Option<StoredListing>> {
        let listing = match self.key {
            ConflictKey::NameSourceUrl => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {} FROM listings WHERE name = ?1 AND source = ?2 AND original_url = ?3",
                        LISTING_COLUMNS
                    ),
                    params![name, source, original_url.unwrap_or_default()],
                    listing_from_row,
                )
                .optional()?,
            ConflictKey::NameSource => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {} FROM listings WHERE name = ?1 AND source = ?2",
                        LISTING_COLUMNS
                    ),
                    params![name, source],
                    listing_from_row,
                )
                .optional()?,
        };

        Ok(listing)
    }

    // ===== Statistics =====

    fn count_listings(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM listings", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>> {
        counts(
            &self.conn,
            "SELECT source, COUNT(*) AS n FROM listings GROUP BY source ORDER BY n DESC, source",
        )
    }

    fn count_by_industry(&self) -> StorageResult<Vec<(String, u64)>> {
        counts(
            &self.conn,
            "SELECT industry, COUNT(*) AS n FROM listings GROUP BY industry ORDER BY n DESC, industry",
        )
    }

    // ===== Sessions =====

    fn record_session(&mut self, session: &SessionRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO scraping_sessions
                 (id, started_at, finished_at, status, outcome, total_listings, sources, errors, config_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                session.id,
                session.started_at,
                session.finished_at,
                session.status,
                session.outcome,
                i64::try_from(session.total_listings).unwrap_or(i64::MAX),
                serde_json::to_string(&session.sources)?,
                serde_json::to_string(&session.errors)?,
                session.config_hash,
            ],
        )?;
        Ok(())
    }

    fn get_latest_session(&self) -> StorageResult<Option<SessionRecord>> {
        let session = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM scraping_sessions ORDER BY started_at DESC, rowid DESC LIMIT 1",
                    SESSION_COLUMNS
                ),
                [],
                session_from_row,
            )
            .optional()?;
        Ok(session)
    }
}
