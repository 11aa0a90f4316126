use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, response::Html, routing::get, Json, Router};
use tower_http::cors::CorsLayer;

use crate::cache::{Snapshot, SnapshotCache};
use crate::render;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .route("/api/stories", get(stories))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let start = Instant::now();
    let snap = state.cache.read();
    Html(render::page(&snap, start.elapsed()))
}

async fn stories(State(state): State<AppState>) -> Json<Arc<Snapshot>> {
    Json(state.cache.read())
}
