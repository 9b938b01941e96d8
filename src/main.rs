//! Trending Pulse — Binary Entrypoint
//! Boots the Axum HTTP server serving the trend dashboard.

use shuttle_axum::ShuttleAxum;
use trending_pulse::PulseConfig;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    trending_pulse::init_tracing();

    let config = PulseConfig::load()?;
    let router = trending_pulse::app(&config).await?;

    Ok(router.into())
}
