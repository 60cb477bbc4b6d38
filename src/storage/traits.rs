//! Storage traits and error types

use crate::storage::{ConflictKey, ListingRow, SessionRecord, StoredListing};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for listing store backends
pub trait ListingStore {
    /// The key deciding whether two rows describe the same listing
    fn conflict_key(&self) -> ConflictKey;

    // ===== Listings =====

    /// Upserts a batch of rows inside a single transaction
    ///
    /// Either every row of the batch is written or none is.
    ///
    /// # Returns
    ///
    /// The number of rows inserted or updated
    fn upsert_listings(&mut self, rows: &[ListingRow]) -> StorageResult<usize>;

    /// Gets a listing by its conflict key columns
    ///
    /// `original_url` is ignored under the legacy `(name, source)` key.
    fn get_listing(
        &self,
        name: &str,
        source: &str,
        original_url: Option<&str>,
    ) -> StorageResult<Option<StoredListing>>;

    // ===== Statistics =====

    fn count_listings(&self) -> StorageResult<u64>;

    /// Listing counts per source, largest first
    fn count_by_source(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Listing counts per industry, largest first
    fn count_by_industry(&self) -> StorageResult<Vec<(String, u64)>>;

    // ===== Sessions =====

    /// Inserts or replaces a session summary
    fn record_session(&mut self, session: &SessionRecord) -> StorageResult<()>;

    /// Gets the most recently started session
    fn get_latest_session(&self) -> StorageResult<Option<SessionRecord>>;
}
