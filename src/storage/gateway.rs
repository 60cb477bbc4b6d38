//! Persistence gateway
//!
//! Deduplicates a session's listings and writes them in fixed-size
//! batches. Every batch commits on its own: a failed batch is logged and
//! counted, and the batches after it are still attempted.

use crate::listing::RawListing;
use crate::storage::{ListingRow, ListingStore};
use serde::Serialize;
use std::collections::HashSet;

/// Outcome of one `persist` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistReport {
    /// Listings handed to the gateway
    pub received: usize,
    /// Listings dropped as in-batch duplicates of an earlier one
    pub duplicates_dropped: usize,
    /// Rows inserted or updated
    pub written: usize,
    pub failed_batches: usize,
    pub batch_errors: Vec<String>,
}

/// Writes listings to a `ListingStore`
pub struct PersistenceGateway<S: ListingStore> {
    store: S,
    batch_size: usize,
}

impl<S: ListingStore> PersistenceGateway<S> {
    pub fn new(store: S, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Persists listings, keeping the first occurrence of each conflict key
    ///
    /// # Arguments
    ///
    /// * `listings` - Normalized listings of one session
    ///
    /// # Returns
    ///
    /// A `PersistReport`; storage failures are reported there, not raised.
    pub fn persist(&mut self, listings: &[RawListing]) -> PersistReport {
        let key = self.store.conflict_key();
        let mut report = PersistReport {
            received: listings.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let mut rows = Vec::with_capacity(listings.len());
        for listing in listings {
            if !seen.insert(key.dedup_key(listing)) {
                report.duplicates_dropped += 1;
                continue;
            }
            match ListingRow::from_listing(listing) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!("Skipping listing {:?}: {}", listing.name, e);
                    report.batch_errors.push(format!("{}: {}", listing.name, e));
                }
            }
        }

        for (index, batch) in rows.chunks(self.batch_size).enumerate() {
            match self.store.upsert_listings(batch) {
                Ok(written) => {
                    tracing::debug!("Batch {} wrote {} rows", index + 1, written);
                    report.written += written;
                }
                Err(e) => {
                    tracing::warn!("Batch {} ({} rows) failed: {}", index + 1, batch.len(), e);
                    report.failed_batches += 1;
                    report.batch_errors.push(format!("batch {}: {}", index + 1, e));
                }
            }
        }

        tracing::info!(
            "Persisted {} of {} listings ({} duplicates, {} failed batches)",
            report.written,
            report.received,
            report.duplicates_dropped,
            report.failed_batches
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ConflictKey, SqliteStorage};

    fn listing(name: &str, url: &str) -> RawListing {
        let mut listing = RawListing::new(name, "TestMarket");
        listing.asking_price = 100_000;
        listing.original_url = Some(url.to_string());
        listing
    }

    fn gateway(key: ConflictKey, batch_size: usize) -> PersistenceGateway<SqliteStorage> {
        PersistenceGateway::new(SqliteStorage::new_in_memory(key).unwrap(), batch_size)
    }

    #[test]
    fn test_in_batch_duplicates_are_dropped() {
        let mut gateway = gateway(ConflictKey::NameSourceUrl, 100);
        let listings = vec![
            listing("Bakery", "https://m.example/1"),
            listing("Bakery", "https://m.example/1"),
            listing("Gym", "https://m.example/2"),
        ];

        let report = gateway.persist(&listings);
        assert_eq!(report.received, 3);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.written, 2);
        assert_eq!(gateway.store().count_listings().unwrap(), 2);
    }

    #[test]
    fn test_rerun_leaves_same_row_count() {
        let mut gateway = gateway(ConflictKey::NameSourceUrl, 2);
        let listings: Vec<_> = (0..5)
            .map(|i| listing(&format!("Business {}", i), &format!("https://m.example/{}", i)))
            .collect();

        gateway.persist(&listings);
        let report = gateway.persist(&listings);

        assert_eq!(report.written, 5);
        assert_eq!(report.failed_batches, 0);
        assert_eq!(gateway.store().count_listings().unwrap(), 5);
    }

    #[test]
    fn test_failed_batch_does_not_stop_later_batches() {
        let mut gateway = gateway(ConflictKey::NameSourceUrl, 2);
        let mut oversized = listing("Holding Co", "https://m.example/3");
        oversized.asking_price = 9_000_000_000;

        let listings = vec![
            listing("Bakery", "https://m.example/1"),
            listing("Gym", "https://m.example/2"),
            oversized,
            listing("Car Wash", "https://m.example/4"),
            listing("Dental Office", "https://m.example/5"),
        ];

        let report = gateway.persist(&listings);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.batch_errors.len(), 1);
        assert!(report.batch_errors[0].starts_with("batch 2:"));
        // Batches 1 and 3 committed; batch 2 rolled back whole
        assert_eq!(report.written, 3);
        assert_eq!(gateway.store().count_listings().unwrap(), 3);
    }

    #[test]
    fn test_legacy_key_merges_same_name_listings() {
        let listings = vec![
            listing("Coffee Shop", "https://m.example/austin"),
            listing("Coffee Shop", "https://m.example/denver"),
        ];

        let mut canonical = gateway(ConflictKey::NameSourceUrl, 100);
        canonical.persist(&listings);
        assert_eq!(canonical.store().count_listings().unwrap(), 2);

        let mut legacy = gateway(ConflictKey::NameSource, 100);
        let report = legacy.persist(&listings);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(legacy.store().count_listings().unwrap(), 1);
    }
}
