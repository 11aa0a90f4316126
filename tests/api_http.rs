// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /            (HTML front page, before and after the first refresh)
// - GET /api/stories (JSON snapshot)

mod common;

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use common::ScriptedSource;
use quiet_news::{api, AppState, SnapshotCache};

const BODY_LIMIT: usize = 1024 * 1024;

async fn seeded_router(n: usize) -> Router {
    let src = Arc::new(ScriptedSource::alternating(20));
    let cache = Arc::new(SnapshotCache::new(src, 16));
    if n > 0 {
        cache.begin_refresh(n).await.expect("seed refresh");
    }
    api::router(AppState::new(cache))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("router response");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, body) = get(seeded_router(0).await, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn index_lists_stories_in_rank_order() {
    let (status, body) = get(seeded_router(5).await, "/").await;
    assert_eq!(status, StatusCode::OK);

    let positions: Vec<usize> = [1, 3, 5, 7, 9]
        .iter()
        .map(|id| {
            body.find(&format!(">Story {id}<"))
                .unwrap_or_else(|| panic!("story {id} missing from page:\n{body}"))
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(!body.contains("Story 11"));
    assert!(!body.contains("Ask "), "url-less stories are filtered");
    assert!(body.contains("(site1.test)"));
    assert!(body.contains("This page was rendered in"));
}

#[tokio::test]
async fn index_before_first_refresh_shows_placeholder() {
    let (status, body) = get(seeded_router(0).await, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No stories yet"));
}

#[tokio::test]
async fn stories_endpoint_returns_snapshot_json() {
    let (status, body) = get(seeded_router(3).await, "/api/stories").await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_str(&body).expect("json body");
    assert_eq!(v["generation"], 1);
    assert_eq!(v["partial"], false);
    assert!(v["built_at"].is_string());

    let stories = v["stories"].as_array().expect("stories array");
    let ids: Vec<u64> = stories.iter().map(|s| s["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 3, 5]);
    assert_eq!(stories[0]["host"], "site1.test");
    assert_eq!(stories[0]["type"], "story");
}

#[tokio::test]
async fn stories_endpoint_follows_the_active_snapshot() {
    let src = Arc::new(ScriptedSource::alternating(20));
    let cache = Arc::new(SnapshotCache::new(src, 16));
    let app = api::router(AppState::new(Arc::clone(&cache)));

    cache.begin_refresh(2).await.expect("first refresh");
    let (_, first) = get(app.clone(), "/api/stories").await;
    let (_, again) = get(app.clone(), "/api/stories").await;
    assert_eq!(first, again);

    cache.begin_refresh(4).await.expect("second refresh");
    let (_, body) = get(app, "/api/stories").await;
    let v: Json = serde_json::from_str(&body).expect("json body");
    assert_eq!(v["generation"], 2);
    assert_eq!(v["stories"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = get(seeded_router(0).await, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
