//! Site adapters against mock marketplaces

use crate::{card, page, site_adapter, test_site};
use listing_harvester::source::SourceAdapter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pagination_across_pages() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/market/listings",
        page(&format!(
            "{}{}<a class=\"next\" href=\"/market/listings/2\">Next</a>",
            card("Neighborhood Bakery", "$450,000"),
            card("Shopify Pet Supplies Store", "$1.2M")
        )),
    )
    .await;
    serve(
        &server,
        "/market/listings/2",
        page(&card("Downtown Car Wash", "$950K")),
    )
    .await;

    let adapter = site_adapter(test_site("market", &server.uri()));
    let result = adapter.scrape().await.unwrap();

    assert!(result.success());
    assert!(result.errors().is_empty());
    assert_eq!(result.total_found(), 3);
    assert_eq!(result.total_scraped(), 3);

    let listings = result.listings();
    assert_eq!(listings[0].asking_price, 450_000);
    assert_eq!(listings[0].industry, "Food & Beverage");
    assert_eq!(listings[1].asking_price, 1_200_000);
    assert_eq!(listings[1].industry, "E-commerce");
    assert_eq!(listings[2].asking_price, 950_000);
    assert_eq!(listings[2].industry, "Automotive");
    assert!(listings.iter().all(|l| l.source == "market-label"));
    assert!(listings.iter().all(|l| l.location == "Unknown"));

    let metrics = adapter.metrics();
    assert_eq!(metrics.total_requests, 2);
    assert_eq!(metrics.successful_requests, 2);
    assert!(metrics.duration_ms.is_some());
}

#[tokio::test]
async fn test_secondary_container_selector() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/fallback/listings",
        page(
            r#"<div class="result"><h3 class="title">SaaS Invoicing Tool</h3>
               <span class="price">$2,500,000</span>
               <span class="revenue">$800K</span>
               <span class="location">Austin, TX</span></div>"#,
        ),
    )
    .await;

    let result = site_adapter(test_site("fallback", &server.uri()))
        .scrape()
        .await
        .unwrap();

    assert!(result.success());
    assert_eq!(result.total_scraped(), 1);
    let listing = &result.listings()[0];
    assert_eq!(listing.name, "SaaS Invoicing Tool");
    assert_eq!(listing.asking_price, 2_500_000);
    assert_eq!(listing.annual_revenue, 800_000);
    assert_eq!(listing.location, "Austin, TX");
    assert_eq!(listing.industry, "SaaS");
}

#[tokio::test]
async fn test_heuristic_containers_when_no_selector_matches() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/heuristic/listings",
        page(
            r#"<article><h2>Family Dental Clinic</h2>
               <a href="/heuristic/d/1">View details</a>
               <p>Asking price $300,000</p></article>
               <article><h2>Contact Us</h2><p>No price here</p></article>"#,
        ),
    )
    .await;

    let result = site_adapter(test_site("heuristic", &server.uri()))
        .scrape()
        .await
        .unwrap();

    assert!(result.success());
    assert_eq!(result.total_found(), 1);
    let listing = &result.listings()[0];
    assert_eq!(listing.name, "Family Dental Clinic");
    assert_eq!(listing.asking_price, 300_000);
    assert_eq!(listing.industry, "Health");
    assert_eq!(
        listing.original_url.as_deref(),
        Some(format!("{}/heuristic/d/1", server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_page_without_listings_is_still_success() {
    let server = MockServer::start().await;

    serve(&server, "/empty/listings", page("<p>No results</p>")).await;

    let result = site_adapter(test_site("empty", &server.uri()))
        .scrape()
        .await
        .unwrap();

    assert!(result.success());
    assert_eq!(result.total_found(), 0);
    assert!(result.listings().is_empty());
}

#[tokio::test]
async fn test_trivial_and_filtered_listings_are_dropped() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/fba/listings",
        page(&format!(
            "{}{}{}",
            card("Amazon FBA Kitchenware Brand", "$600,000"),
            card("Local Plumbing Company", "$400,000"),
            card("Undisclosed Opportunity", "Contact broker")
        )),
    )
    .await;

    let mut site = test_site("fba", &server.uri());
    site.fba_only = true;
    let adapter = site_adapter(site);
    let result = adapter.scrape().await.unwrap();

    assert_eq!(result.total_found(), 3);
    assert_eq!(result.total_scraped(), 1);
    assert_eq!(result.listings()[0].name, "Amazon FBA Kitchenware Brand");
    assert_eq!(result.listings()[0].industry, "E-commerce");
    assert!(result.errors().is_empty());

    let metrics = adapter.metrics();
    assert_eq!(metrics.listings_filtered, 1);
    assert_eq!(metrics.listings_discarded, 1);
    assert!(metrics.errors.is_empty());
}

#[tokio::test]
async fn test_server_error_on_later_page_keeps_earlier_listings() {
    let server = MockServer::start().await;

    serve(
        &server,
        "/flaky/listings",
        page(&format!(
            "{}<a class=\"next\" href=\"/flaky/listings/2\">Next</a>",
            card("Corner Cafe", "$150,000")
        )),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/flaky/listings/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = site_adapter(test_site("flaky", &server.uri()));
    let result = adapter.scrape().await.unwrap();

    assert!(result.success());
    assert_eq!(result.total_scraped(), 1);
    assert_eq!(result.errors().len(), 1);
    assert!(result.errors()[0].starts_with("page 2:"));
    assert!(result.errors()[0].contains("HTTP 500"));
    assert_eq!(adapter.metrics().failed_requests, 1);
}

#[tokio::test]
async fn test_server_error_on_first_page_fails_source() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down/listings"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = site_adapter(test_site("down", &server.uri()))
        .scrape()
        .await
        .unwrap();

    assert!(!result.success());
    assert!(result.listings().is_empty());
    assert!(result.errors()[0].contains("HTTP 502"));
}
