// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod metrics;
pub mod page_cache;
pub mod render;
pub mod sources;
pub mod trends;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub use crate::api::{create_router, AppState};
pub use crate::config::PulseConfig;
pub use crate::sources::Source;
pub use crate::trends::stores::{dynamo::DynamoStore, memory::MemoryStore};
pub use crate::trends::types::{TrendBoard, TrendItem, TrendStore};

/// Install a tracing subscriber. Compact output by default, JSON when
/// `PULSE_LOG_FORMAT=json`. A no-op if the host runtime already installed one.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trending_pulse=info,warn"));

    let json = std::env::var("PULSE_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

/// Fixture store when `fixture_path` is configured, DynamoDB otherwise.
pub async fn build_store(config: &PulseConfig) -> Result<Arc<dyn TrendStore>> {
    if let Some(path) = &config.fixture_path {
        tracing::info!(path = %path.display(), "serving trends from fixture");
        let store = MemoryStore::from_fixture_path(config.table.clone(), path)?;
        return Ok(Arc::new(store));
    }
    Ok(Arc::new(DynamoStore::connect(config).await))
}

/// Full application router: page, JSON view, health and `/metrics`.
pub fn app_with_store(store: Arc<dyn TrendStore>, config: &PulseConfig) -> Result<Router> {
    let metrics = crate::metrics::Metrics::init(config.revalidate_secs)?;
    let state = AppState::new(store, config);
    Ok(create_router(state).merge(metrics.router()))
}

pub async fn app(config: &PulseConfig) -> Result<Router> {
    let store = build_store(config).await?;
    tracing::info!(
        table = %config.table,
        store = store.name(),
        revalidate_secs = config.revalidate_secs,
        "trending pulse ready"
    );
    app_with_store(store, config)
}
