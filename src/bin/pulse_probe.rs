//! Runs one fetch cycle against the configured store and prints a per-source
//! summary, or the rendered page with `--html`. Read-only.

use trending_pulse::render::render_page;
use trending_pulse::trends::fetch_board;
use trending_pulse::PulseConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    trending_pulse::init_tracing();

    let want_html = std::env::args().skip(1).any(|a| a == "--html");

    let config = PulseConfig::load()?;
    let store = trending_pulse::build_store(&config).await?;
    let board = fetch_board(store.as_ref(), &config.table).await;

    if want_html {
        println!("{}", render_page(&board));
        return Ok(());
    }

    println!("table={} store={}", config.table, store.name());
    for slot in board.slots() {
        let updated = slot
            .updated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:<7} {:>3} items  updated {}",
            slot.source.key(),
            slot.status.as_str(),
            slot.items.len(),
            updated
        );
    }
    Ok(())
}
