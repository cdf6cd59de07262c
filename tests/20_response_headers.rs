mod common;

use axum::body::Body;
use axum::http::{header, Request};
use tower::ServiceExt;

const SAFARI_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1";
const CHROME_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[tokio::test]
async fn every_response_carries_cache_defeat_headers() {
    let response = common::app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    let cache_control = headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(cache_control.contains("no-store"), "{cache_control}");
    assert!(cache_control.contains("must-revalidate"), "{cache_control}");
    assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
    assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");
    assert_eq!(headers.get("surrogate-control").unwrap(), "no-store");
}

#[tokio::test]
async fn errors_carry_cache_defeat_headers_too() {
    let response = common::app()
        .oneshot(
            Request::builder()
                .uri("/api/agora/token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .contains("no-store"));
}

#[tokio::test]
async fn webkit_user_agents_get_extra_cache_defeat() {
    let response = common::app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::USER_AGENT, SAFARI_UA)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    let cache_control = headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(cache_control.contains("private"), "{cache_control}");
    assert!(cache_control.contains("max-age=0"), "{cache_control}");

    let vary: Vec<_> = headers
        .get_all(header::VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    assert!(vary.iter().any(|v| v.contains('*')), "{vary:?}");
}

#[tokio::test]
async fn chromium_user_agents_get_the_standard_set() {
    let response = common::app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::USER_AGENT, CHROME_UA)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(!cache_control.contains("private"), "{cache_control}");
}

#[tokio::test]
async fn cross_origin_requests_are_allowed() {
    let response = common::app()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://app.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
