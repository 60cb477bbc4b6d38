//! On-disk listing store through the persistence gateway

use listing_harvester::output::load_statistics;
use listing_harvester::storage::{open_storage, ConflictKey, ListingStore, PersistenceGateway};
use listing_harvester::RawListing;
use tempfile::TempDir;

fn listing(name: &str, source: &str, url: Option<&str>, price: u64) -> RawListing {
    let mut listing = RawListing::new(name, source);
    listing.asking_price = price;
    listing.industry = "Services".to_string();
    listing.original_url = url.map(str::to_string);
    listing
}

fn batch() -> Vec<RawListing> {
    vec![
        listing("Cleaning Co", "BizBuySell", Some("https://b.example/1"), 200_000),
        listing("Cleaning Co", "BizBuySell", Some("https://b.example/2"), 210_000),
        listing("Pool Service", "BizQuest", None, 90_000),
        listing("Pool Service", "BizQuest", None, 95_000),
    ]
}

#[test]
fn test_same_batch_twice_on_disk() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("listings.db");

    {
        let storage = open_storage(&db_path, ConflictKey::NameSourceUrl).unwrap();
        let mut gateway = PersistenceGateway::new(storage, 10);

        let report = gateway.persist(&batch());
        assert_eq!(report.received, 4);
        assert_eq!(report.duplicates_dropped, 1);
        assert_eq!(report.written, 3);

        gateway.persist(&batch());
        assert_eq!(gateway.store().count_listings().unwrap(), 3);
    }

    let reopened = open_storage(&db_path, ConflictKey::NameSourceUrl).unwrap();
    assert_eq!(reopened.count_listings().unwrap(), 3);

    let pool = reopened
        .get_listing("Pool Service", "BizQuest", None)
        .unwrap()
        .unwrap();
    assert_eq!(pool.asking_price, 90_000);
    assert_eq!(pool.original_url, None);
}

#[test]
fn test_legacy_key_merges_listings_across_urls() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("legacy.db");

    let storage = open_storage(&db_path, ConflictKey::NameSource).unwrap();
    let mut gateway = PersistenceGateway::new(storage, 10);

    let report = gateway.persist(&batch());
    assert_eq!(report.duplicates_dropped, 2);
    assert_eq!(gateway.store().count_listings().unwrap(), 2);

    let cleaning = gateway
        .store()
        .get_listing("Cleaning Co", "BizBuySell", None)
        .unwrap()
        .unwrap();
    assert_eq!(cleaning.asking_price, 200_000);
}

#[test]
fn test_statistics_from_disk() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("stats.db");

    let storage = open_storage(&db_path, ConflictKey::default()).unwrap();
    let mut gateway = PersistenceGateway::new(storage, 10);
    gateway.persist(&batch());

    let stats = load_statistics(gateway.store()).unwrap();
    assert_eq!(stats.total_listings, 3);
    assert_eq!(
        stats.by_source,
        vec![("BizBuySell".to_string(), 2), ("BizQuest".to_string(), 1)]
    );
    assert_eq!(stats.by_industry, vec![("Services".to_string(), 3)]);
}
