//! Storage module for persisting listings and sessions
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Listing upserts keyed by the configured conflict key
//! - Session summaries
//! - The persistence gateway that deduplicates and batches writes

mod gateway;
mod schema;
mod sqlite;
mod traits;

pub use gateway::{PersistReport, PersistenceGateway};
pub use sqlite::SqliteStorage;
pub use traits::{ListingStore, StorageError, StorageResult};

use crate::listing::RawListing;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opens (or creates) the listing store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
/// * `key` - Conflict key for listing upserts
pub fn open_storage(path: &Path, key: ConflictKey) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path, key)
}

/// Fields identifying one real-world listing
///
/// `NameSourceUrl` is the canonical key. `NameSource` is the legacy key:
/// two different businesses with the same title on one marketplace collapse
/// into a single row under it. Switching a populated store between keys is a
/// breaking change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKey {
    #[default]
    NameSourceUrl,
    NameSource,
}

impl ConflictKey {
    pub const ALL: [ConflictKey; 2] = [ConflictKey::NameSourceUrl, ConflictKey::NameSource];

    /// Column list of the unique index
    pub fn columns(&self) -> &'static str {
        match self {
            Self::NameSourceUrl => "name, source, original_url",
            Self::NameSource => "name, source",
        }
    }

    pub fn index_name(&self) -> &'static str {
        match self {
            Self::NameSourceUrl => "idx_listings_name_source_url",
            Self::NameSource => "idx_listings_name_source",
        }
    }

    /// In-memory dedup key for a listing
    pub fn dedup_key(&self, listing: &RawListing) -> (String, String, String) {
        let url = match self {
            Self::NameSourceUrl => listing.original_url.clone().unwrap_or_default(),
            Self::NameSource => String::new(),
        };
        (listing.name.clone(), listing.source.clone(), url)
    }
}

/// A listing mapped to the `listings` columns
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub name: String,
    pub description: Option<String>,
    pub asking_price: i64,
    pub annual_revenue: i64,
    pub industry: String,
    pub location: String,
    pub source: String,
    /// JSON array text
    pub highlights: String,
    pub image_url: Option<String>,
    /// Empty when the listing has no URL, so the unique index applies
    pub original_url: String,
    pub status: String,
    pub scraped_at: String,
}

impl ListingRow {
    pub fn from_listing(listing: &RawListing) -> StorageResult<Self> {
        Ok(Self {
            name: listing.name.clone(),
            description: listing.description.clone(),
            asking_price: i64::try_from(listing.asking_price).unwrap_or(i64::MAX),
            annual_revenue: i64::try_from(listing.annual_revenue).unwrap_or(i64::MAX),
            industry: listing.industry.clone(),
            location: listing.location.clone(),
            source: listing.source.clone(),
            highlights: serde_json::to_string(&listing.highlights)?,
            image_url: listing.image_url.clone(),
            original_url: listing.original_url.clone().unwrap_or_default(),
            status: "active".to_string(),
            scraped_at: listing.scraped_at.to_rfc3339(),
        })
    }
}

/// A listing as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredListing {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub asking_price: u64,
    pub annual_revenue: u64,
    pub industry: String,
    pub location: String,
    pub source: String,
    pub highlights: Vec<String>,
    pub image_url: Option<String>,
    pub original_url: Option<String>,
    pub status: String,
    pub scraped_at: String,
    pub updated_at: String,
}

/// Session summary row
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: String,
    pub outcome: Option<String>,
    pub total_listings: u64,
    pub sources: Vec<String>,
    pub errors: Vec<String>,
    pub config_hash: String,
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
