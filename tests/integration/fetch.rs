//! Fetch layer against mock servers

use crate::{direct_fetcher, fast_options, relaxed_limiter};
use listing_harvester::fetch::{build_http_client, FetchOptions, Fetcher, ProxyFetcher};
use listing_harvester::FetchError;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn proxy(server: &MockServer) -> ProxyFetcher {
    let client = build_http_client("TestHarvester/1.0").unwrap();
    ProxyFetcher::new(
        client,
        format!("{}/render", server.uri()),
        "test-key",
        relaxed_limiter(),
    )
}

#[tokio::test]
async fn test_proxy_sends_credential_target_and_render_flag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/render"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("url", "https://market.example.com/listings?page=1"))
        .and(query_param("render", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rendered</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let options = FetchOptions {
        timeout: Duration::from_secs(5),
        render_js: true,
    };
    let body = proxy(&server)
        .fetch("https://market.example.com/listings?page=1", &options)
        .await
        .unwrap();

    assert_eq!(body, "<html>rendered</html>");
}

#[tokio::test]
async fn test_proxy_render_flag_false() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/render"))
        .and(query_param("render", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
        .expect(1)
        .mount(&server)
        .await;

    let body = proxy(&server)
        .fetch("https://market.example.com/", &fast_options())
        .await
        .unwrap();
    assert_eq!(body, "plain");
}

#[tokio::test]
async fn test_proxy_non_2xx_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let result = proxy(&server)
        .fetch("https://market.example.com/", &fast_options())
        .await;

    match result {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 403);
            assert_eq!(url, "https://market.example.com/");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let options = FetchOptions {
        timeout: Duration::from_millis(200),
        render_js: false,
    };
    let result = direct_fetcher()
        .fetch(&format!("{}/slow", server.uri()), &options)
        .await;

    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_direct_fetch_returns_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let body = direct_fetcher()
        .fetch(&format!("{}/listings", server.uri()), &fast_options())
        .await
        .unwrap();
    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn test_direct_fetch_rejects_non_http_url() {
    let result = direct_fetcher()
        .fetch("ftp://market.example.com/", &fast_options())
        .await;

    assert!(matches!(result, Err(FetchError::InvalidRequest { .. })));
}
