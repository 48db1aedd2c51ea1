use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use photorelay::clients::{PhotoSource, UpstreamError};
use photorelay::config::Config;
use photorelay::models::{Collection, Photo, PhotoStatistics, PhotoUser};
use photorelay::services::CacheOutcome;
use photorelay::state::SharedState;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
struct StubSource {
    list_calls: AtomicUsize,
    stats_calls: AtomicUsize,
    pages: Mutex<Vec<(u32, u32)>>,
}

#[async_trait]
impl PhotoSource for StubSource {
    async fn list_photos(&self, page: u32, per_page: u32) -> Result<Vec<Photo>, UpstreamError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pages.lock().unwrap().push((page, per_page));

        Ok(["x1", "x2"]
            .iter()
            .map(|id| Photo {
                id: (*id).to_string(),
                urls: BTreeMap::from([("regular".to_string(), format!("https://img/{id}"))]),
                user: PhotoUser {
                    name: "Dee Lens".to_string(),
                    username: "digilens".to_string(),
                    ..PhotoUser::default()
                },
                likes: 4,
                ..Photo::default()
            })
            .collect())
    }

    async fn photo_statistics(&self, _photo_id: &str) -> Result<PhotoStatistics, UpstreamError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PhotoStatistics {
            views: 7,
            downloads: 3,
        })
    }

    async fn list_collections(
        &self,
        _page: u32,
        _per_page: u32,
    ) -> Result<Vec<Collection>, UpstreamError> {
        Ok(vec![Collection {
            id: "c1".to_string(),
            title: "Studio".to_string(),
            description: None,
            total_photos: 12,
            ..Collection::default()
        }])
    }
}

const GATE_INTERVAL: Duration = Duration::from_millis(300);

struct TestApp {
    router: Router,
    source: Arc<StubSource>,
}

fn spawn_app(gate_enabled: bool) -> TestApp {
    let mut config = Config::default();
    config.gate.enabled = gate_enabled;
    config.gate.min_interval_ms = GATE_INTERVAL.as_millis() as u64;
    config.upstream.stats_spacing_ms = 0;
    config.upstream.photos_per_page = 20;

    let source = Arc::new(StubSource::default());
    let shared = Arc::new(SharedState::with_source(config, source.clone()));
    let state = photorelay::api::create_app_state(shared, None);

    TestApp {
        router: photorelay::api::router(state),
        source,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_reports_readiness() {
    let app = spawn_app(false);

    let (status, _, body) = get(&app.router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("running"));
}

#[tokio::test]
async fn test_photos_default_to_first_page() {
    let app = spawn_app(false);

    let (status, body) = get_json(&app.router, "/api/photos").await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], "x1");
    assert_eq!(results[0]["total_likes"], 4);
    assert_eq!(results[0]["total_views"], 7);
    assert_eq!(results[0]["total_downloads"], 3);
    assert_eq!(results[0]["attribution"], "Photo by Dee Lens on Unsplash");
    assert_eq!(
        results[0]["credit_url"],
        "https://unsplash.com/@digilens?utm_source=photorelay&utm_medium=referral"
    );
    assert_eq!(*app.source.pages.lock().unwrap(), vec![(1, 20)]);
}

#[tokio::test]
async fn test_repeat_request_is_served_from_cache() {
    let app = spawn_app(false);

    let (_, first) = get_json(&app.router, "/api/photos?page=2").await;
    let (_, second) = get_json(&app.router, "/api/photos?page=2").await;

    assert_eq!(first, second);
    assert_eq!(app.source.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(app.source.stats_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_page_is_rejected() {
    let app = spawn_app(false);

    for uri in ["/api/photos?page=0", "/api/photos?page=abc", "/api/photos?page=-1"] {
        let (status, body) = get_json(&app.router, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid_request");
    }

    assert_eq!(app.source.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_gate_rejects_rapid_requests() {
    let app = spawn_app(true);

    let (status, _, _) = get(&app.router, "/").await;
    assert_eq!(status, StatusCode::OK);

    let (status, headers, body) = get(&app.router, "/").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers[header::RETRY_AFTER], "1");
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "too_many_requests");

    tokio::time::sleep(GATE_INTERVAL + Duration::from_millis(50)).await;
    let (status, _, _) = get(&app.router, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_gate_rejection_skips_upstream() {
    let app = spawn_app(true);

    let (status, _) = get_json(&app.router, "/api/photos?page=1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_json(&app.router, "/api/photos?page=3").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(app.source.list_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_collections_endpoint() {
    let app = spawn_app(false);

    let (status, body) = get_json(&app.router, "/api/collections").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["id"], "c1");
    assert_eq!(body["results"][0]["total_photos"], 12);
    assert_eq!(app.source.stats_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_system_status_reports_cache() {
    let app = spawn_app(false);

    get_json(&app.router, "/api/photos?page=1").await;
    get_json(&app.router, "/api/photos?page=2").await;

    let (status, body) = get_json(&app.router, "/api/system/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["cache"]["photo_pages"], 2);
    assert_eq!(body["data"]["cache"]["ttl_seconds"], 3600);
    assert_eq!(body["data"]["photos_per_page"], 20);
    assert_eq!(body["data"]["gate"]["enabled"], false);
}

#[tokio::test]
async fn test_list_responses_are_tagged_with_cache_outcome() {
    let app = spawn_app(false);

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/photos?page=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        outcomes.push(response.extensions().get::<CacheOutcome>().copied());
    }

    assert_eq!(
        outcomes,
        vec![Some(CacheOutcome::Miss), Some(CacheOutcome::Hit)]
    );
}
