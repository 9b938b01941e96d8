use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::PulseConfig;
use crate::page_cache::{CacheStatus, PageCache, PageSnapshot};
use crate::trends::{self, types::TrendBoard, types::TrendStore};

pub const PAGE_CACHE_HEADER: &str = "x-page-cache";

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn TrendStore>,
    table: Arc<str>,
    pages: Arc<PageCache>,
}

impl AppState {
    pub fn new(store: Arc<dyn TrendStore>, config: &PulseConfig) -> Self {
        Self::with_window(store, &config.table, config.revalidate_window())
    }

    pub fn with_window(store: Arc<dyn TrendStore>, table: &str, window: Duration) -> Self {
        Self {
            store,
            table: Arc::from(table),
            pages: Arc::new(PageCache::new(window)),
        }
    }

    /// Current page, regenerating through a fresh fetch cycle when stale.
    pub async fn snapshot(&self) -> (Arc<PageSnapshot>, CacheStatus) {
        let store = Arc::clone(&self.store);
        let table = Arc::clone(&self.table);
        self.pages
            .get_or_generate(Instant::now(), || async move {
                trends::fetch_board(store.as_ref(), &table).await
            })
            .await
    }

    fn cache_headers(&self, status: CacheStatus) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let cc = format!(
            "public, s-maxage={}, stale-while-revalidate",
            self.pages.window().as_secs()
        );
        if let Ok(v) = HeaderValue::from_str(&cc) {
            headers.insert(header::CACHE_CONTROL, v);
        }
        headers.insert(
            HeaderName::from_static(PAGE_CACHE_HEADER),
            HeaderValue::from_static(status.as_str()),
        );
        headers
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page))
        .route("/api/trends", get(trends_json))
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn page(State(state): State<AppState>) -> impl IntoResponse {
    let (snap, status) = state.snapshot().await;
    let mut headers = state.cache_headers(status);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    (headers, snap.html.clone())
}

async fn trends_json(State(state): State<AppState>) -> impl IntoResponse {
    let (snap, status) = state.snapshot().await;
    let board: TrendBoard = snap.board.clone();
    (state.cache_headers(status), Json(board))
}
