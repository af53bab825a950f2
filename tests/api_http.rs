// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/deadlines (envelope shape, ordering, fallback tagging)
// - POST → 405, OPTIONS → 200 empty, neither touches a source
// - CORS headers
// - resolver panic → 500 failure envelope

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use exam_deadline_aggregator::api::{self, AppState};
use exam_deadline_aggregator::deadlines::fetcher::{FetchError, PageFetcher};
use exam_deadline_aggregator::deadlines::registry::SourceRegistry;
use exam_deadline_aggregator::DeadlineService;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

/// Serves a fixed marquee for registry sources 1 and 3, times out the rest.
#[derive(Default)]
struct CountingFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl PageFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("jeemain") {
            Ok("<marquee>Apply before 05/09/2025 for registration</marquee>".into())
        } else if url.contains("consortiumofnlus") {
            Ok("<marquee>CLAT registration closes 15/10/2025</marquee>".into())
        } else {
            Err(FetchError::Timeout(Duration::from_millis(5000)))
        }
    }
}

struct PanickingFetcher;

#[async_trait]
impl PageFetcher for PanickingFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        panic!("resolver blew up");
    }
}

fn test_router(fetcher: Arc<dyn PageFetcher>) -> Router {
    let state = AppState {
        deadlines: DeadlineService::new(fetcher, SourceRegistry::reference()),
    };
    api::router(state)
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec()
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(Arc::new(CountingFetcher::default()));

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");
    let body = String::from_utf8(body_bytes(resp).await).expect("utf8");
    assert_eq!(body.trim(), "OK");
}

#[tokio::test]
async fn get_deadlines_returns_full_ordered_envelope() {
    let fetcher = Arc::new(CountingFetcher::default());
    let app = test_router(fetcher.clone());

    let req = Request::builder()
        .method("GET")
        .uri("/api/deadlines")
        .header("origin", "https://frontend.example.org")
        .body(Body::empty())
        .expect("build GET /api/deadlines");

    let resp = app.oneshot(req).await.expect("oneshot /api/deadlines");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|h| h.to_str().ok()),
        Some("*")
    );

    let v: Json = serde_json::from_slice(&body_bytes(resp).await).expect("parse json");
    assert_eq!(v["success"], true);
    assert_eq!(v["count"], 4);
    assert!(v["lastUpdated"].as_str().is_some_and(|s| s.ends_with('Z')));

    let data = v["data"].as_array().expect("data array");
    let ids: Vec<i64> = data.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    assert_eq!(data[0]["date"], "2025-09-05");
    assert_eq!(data[0]["source"], "NTA Official");
    assert_eq!(data[1]["source"], "Estimated");
    assert_eq!(data[1]["date"], "2026-05-03");
    assert_eq!(data[2]["date"], "2025-10-15");
    assert_eq!(data[2]["source"], "Consortium of NLUs Official");
    assert_eq!(data[3]["source"], "Estimated");

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn post_is_rejected_without_fetching() {
    let fetcher = Arc::new(CountingFetcher::default());
    let app = test_router(fetcher.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/api/deadlines")
        .header("origin", "https://frontend.example.org")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .expect("build POST /api/deadlines");

    let resp = app.oneshot(req).await.expect("oneshot POST");
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(resp.headers().contains_key("access-control-allow-origin"));

    let v: Json = serde_json::from_slice(&body_bytes(resp).await).expect("parse json");
    assert_eq!(v, serde_json::json!({ "error": "Method not allowed" }));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn preflight_returns_empty_200_without_fetching() {
    let fetcher = Arc::new(CountingFetcher::default());
    let app = test_router(fetcher.clone());

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/deadlines")
        .header("origin", "https://frontend.example.org")
        .header("access-control-request-method", "GET")
        .header("access-control-request-headers", "authorization")
        .body(Body::empty())
        .expect("build OPTIONS");

    let resp = app.oneshot(req).await.expect("oneshot OPTIONS");
    assert_eq!(resp.status(), StatusCode::OK);

    let headers = resp.headers().clone();
    let methods = headers
        .get("access-control-allow-methods")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_ascii_uppercase();
    assert!(methods.contains("GET") && methods.contains("OPTIONS"), "{methods}");
    let allowed = headers
        .get("access-control-allow-headers")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(
        allowed.contains("content-type") && allowed.contains("authorization"),
        "{allowed}"
    );

    assert!(body_bytes(resp).await.is_empty());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bare_options_is_also_empty_200() {
    let fetcher = Arc::new(CountingFetcher::default());
    let app = test_router(fetcher.clone());

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/deadlines")
        .body(Body::empty())
        .expect("build OPTIONS");

    let resp = app.oneshot(req).await.expect("oneshot OPTIONS");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn aggregation_failure_yields_500_envelope() {
    let app = test_router(Arc::new(PanickingFetcher));

    let req = Request::builder()
        .method("GET")
        .uri("/api/deadlines")
        .body(Body::empty())
        .expect("build GET");

    let resp = app.oneshot(req).await.expect("oneshot GET");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let v: Json = serde_json::from_slice(&body_bytes(resp).await).expect("parse json");
    assert_eq!(v["success"], false);
    assert_eq!(v["error"], "Failed to fetch deadlines");
    assert!(v["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(v.get("data").is_none());
}
