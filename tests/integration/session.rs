//! Orchestrator sessions over mock marketplaces

use crate::{card, page, site_adapter, test_site};
use listing_harvester::config::parse_config;
use listing_harvester::output::session_to_json;
use listing_harvester::session::{build_orchestrator, resolve_sites, selected_sources};
use listing_harvester::storage::{
    open_storage, ConflictKey, ListingStore, PersistenceGateway, SqliteStorage,
};
use async_trait::async_trait;
use listing_harvester::source::{ScraperMetrics, ScrapingResult};
use listing_harvester::{HarvestError, Orchestrator, SessionOutcome, SessionStatus, SourceAdapter};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALPHA_NAMES: [&str; 5] = [
    "Corner Bakery",
    "Shopify Candle Store",
    "Mobile App Studio",
    "Family Dental Clinic",
    "Express Car Wash",
];

/// Serves five listings for `alpha` and a 500 for `beta`
async fn marketplaces() -> MockServer {
    let server = MockServer::start().await;

    let cards: String = ALPHA_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| card(name, &format!("${},000", (i + 1) * 100)))
        .collect();
    Mock::given(method("GET"))
        .and(path("/alpha/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page(&cards)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/beta/listings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    server
}

fn orchestrator(server: &MockServer) -> Orchestrator {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(site_adapter(test_site("alpha", &server.uri()))),
        Box::new(site_adapter(test_site("beta", &server.uri()))),
    ];
    Orchestrator::new(adapters, Duration::ZERO)
}

#[tokio::test]
async fn test_one_failing_source_does_not_abort_session() {
    let server = marketplaces().await;

    let session = orchestrator(&server).run_all().await;

    assert!(session.is_finished());
    assert_eq!(session.total_listings(), 5);
    assert_eq!(session.sources(), ["alpha", "beta"]);
    assert_eq!(session.errors().len(), 1);
    assert!(session.errors()[0].starts_with("beta:"));
    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.outcome(), Some(SessionOutcome::PartiallySucceeded));

    assert!(session.results()["alpha"].success());
    assert!(!session.results()["beta"].success());
    assert_eq!(session.metrics()["alpha"].listings_found, 5);
}

/// An adapter whose scrape raises instead of returning a result
struct RaisingAdapter;

#[async_trait]
impl SourceAdapter for RaisingAdapter {
    fn name(&self) -> &str {
        "b"
    }

    async fn scrape(&self) -> Result<ScrapingResult, HarvestError> {
        Err(HarvestError::UnknownSource("listing index moved".to_string()))
    }

    fn metrics(&self) -> ScraperMetrics {
        ScraperMetrics::default()
    }
}

#[tokio::test]
async fn test_raising_adapter_does_not_abort_session() {
    let server = marketplaces().await;
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(site_adapter(test_site("alpha", &server.uri()))),
        Box::new(RaisingAdapter),
    ];

    let session = Orchestrator::new(adapters, Duration::ZERO).run_all().await;

    assert_eq!(session.total_listings(), 5);
    assert_eq!(session.sources(), ["alpha", "b"]);
    assert_eq!(session.errors().len(), 1);
    assert!(session.errors()[0].starts_with("b:"));
    // Any session error marks the legacy status failed
    assert_eq!(session.status(), SessionStatus::Failed);
    assert_eq!(session.outcome(), Some(SessionOutcome::PartiallySucceeded));

    let raised = &session.results()["b"];
    assert!(!raised.success());
    assert!(raised.listings().is_empty());
    assert!(raised.errors()[0].contains("listing index moved"));
    assert!(session.metrics().contains_key("b"));
}

#[tokio::test]
async fn test_session_json_shape() {
    let server = marketplaces().await;

    let session = orchestrator(&server).run_all().await;
    let json: serde_json::Value = serde_json::from_str(&session_to_json(&session).unwrap()).unwrap();

    assert_eq!(json["status"], "failed");
    assert_eq!(json["outcome"], "partially_succeeded");
    assert_eq!(json["totalListings"], 5);
    assert!(json["startTime"].is_string());
    assert!(json["endTime"].is_string());
    assert_eq!(json["results"]["alpha"]["totalScraped"], 5);
    assert_eq!(json["results"]["beta"]["success"], false);
    assert_eq!(json["errors"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_subset_reports_unknown_sources() {
    let server = marketplaces().await;

    let session = orchestrator(&server).run_subset(&["alpha", "ghost"]).await;

    assert_eq!(session.sources(), ["alpha"]);
    assert_eq!(session.total_listings(), 5);
    assert_eq!(session.errors(), ["ghost: unknown source"]);
    assert_eq!(session.outcome(), Some(SessionOutcome::PartiallySucceeded));
}

#[tokio::test]
async fn test_all_sources_succeeding() {
    let server = marketplaces().await;

    let session = orchestrator(&server).run_subset(&["alpha"]).await;

    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.outcome(), Some(SessionOutcome::Succeeded));
}

#[tokio::test]
async fn test_run_one() {
    let server = marketplaces().await;
    let orchestrator = orchestrator(&server);

    let result = orchestrator.run_one("beta").await.unwrap();
    assert!(!result.success());
    assert!(result.errors()[0].contains("HTTP 500"));

    let missing = orchestrator.run_one("ghost").await;
    assert!(matches!(missing, Err(HarvestError::UnknownSource(name)) if name == "ghost"));
}

#[tokio::test]
async fn test_run_and_persist_is_idempotent() {
    let server = marketplaces().await;
    let orchestrator = orchestrator(&server).with_config_hash("abc123");
    let mut gateway =
        PersistenceGateway::new(SqliteStorage::new_in_memory(ConflictKey::default()).unwrap(), 2);

    let first = orchestrator
        .run_and_persist(None::<&[&str]>, &mut gateway)
        .await;
    let second = orchestrator
        .run_and_persist(None::<&[&str]>, &mut gateway)
        .await;

    assert_eq!(first.persisted().map(|r| r.written), Some(5));
    assert_eq!(second.persisted().map(|r| r.failed_batches), Some(0));
    assert_eq!(gateway.store().count_listings().unwrap(), 5);

    let record = gateway.store().get_latest_session().unwrap().unwrap();
    assert_eq!(record.id, second.id().to_string());
    assert_eq!(record.status, "failed");
    assert_eq!(record.outcome.as_deref(), Some("partially_succeeded"));
    assert_eq!(record.total_listings, 5);
    assert_eq!(record.config_hash, "abc123");
}

#[tokio::test]
async fn test_configured_sites_end_to_end() {
    let server = marketplaces().await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("listings.db");

    let config = parse_config(&format!(
        r#"
        enabled-sources = ["alpha"]

        [proxy]
        endpoint = "https://proxy.example.com/"
        api-key-env = "LISTING_HARVESTER_IT_KEY_UNSET"

        [scraper]
        page-delay-ms = 0
        source-delay-ms = 0

        [rate-limit]
        requests-per-minute = 6000
        burst = 100

        [output]
        database-path = "{db}"

        [[site]]
        name = "alpha"
        source-label = "Alpha Brokers"
        start-url = "{base}/alpha/listings"
        use-proxy = false
        container-selectors = [".listing-card"]

        [site.fields]
        name = [".title"]
        price = [".price"]
        "#,
        db = db_path.display(),
        base = server.uri()
    ))
    .unwrap();

    let sites = resolve_sites(&config).unwrap();
    let selected = selected_sources(&config, &sites, &[]);
    assert_eq!(selected, vec!["alpha"]);

    let orchestrator = build_orchestrator(&config, &sites, &selected).unwrap();
    let storage = open_storage(&db_path, config.output.conflict_key).unwrap();
    let mut gateway = PersistenceGateway::new(storage, config.output.batch_size);

    let session = orchestrator
        .run_and_persist(Some(selected.as_slice()), &mut gateway)
        .await;
    assert_eq!(session.outcome(), Some(SessionOutcome::Succeeded));
    drop(gateway);

    let reopened = open_storage(&db_path, ConflictKey::default()).unwrap();
    assert_eq!(reopened.count_listings().unwrap(), 5);
    assert_eq!(
        reopened.count_by_source().unwrap(),
        vec![("Alpha Brokers".to_string(), 5)]
    );
    let listing = reopened
        .get_listing("Corner Bakery", "Alpha Brokers", None)
        .unwrap()
        .unwrap();
    assert_eq!(listing.asking_price, 100_000);
}
