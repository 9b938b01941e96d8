// src/trends/mod.rs
pub mod stores;
pub mod types;

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::Value;

use crate::sources::Source;
use crate::trends::types::{RawRecord, SourceSlot, TrendBoard, TrendItem, TrendStore};

pub const DEFAULT_TABLE: &str = "TrendingData";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "trends_fetch_total",
            "Settled trend reads, labelled by source and slot status."
        );
        describe_histogram!("trends_fetch_ms", "Trend read latency in milliseconds.");
    });
}

/// Turn one raw read into a slot. Every failure mode ends as an empty slot here,
/// so nothing downstream ever sees a read error.
pub fn settle(source: Source, read: Result<Option<RawRecord>>) -> SourceSlot {
    let record = match read {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!(target: "trends", source = source.key(), "no record");
            return SourceSlot::absent(source);
        }
        Err(e) => {
            tracing::warn!(target: "trends", source = source.key(), error = ?e, "trend read failed");
            return SourceSlot::failed(source);
        }
    };

    let updated_at = record.get("updated_at").and_then(parse_updated_at);

    let data = match record.get("data") {
        None | Some(Value::Null) => {
            tracing::debug!(target: "trends", source = source.key(), "record has no data");
            return SourceSlot::absent(source).with_updated_at(updated_at);
        }
        Some(data) => data,
    };

    let Value::Array(entries) = data else {
        tracing::warn!(
            target: "trends",
            source = source.key(),
            "malformed trend payload: data is not a list"
        );
        return SourceSlot::failed(source).with_updated_at(updated_at);
    };

    let items = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match TrendItem::deserialize(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(
                    target: "trends",
                    source = source.key(),
                    index,
                    error = %e,
                    "dropping malformed trend item"
                );
                None
            }
        })
        .collect();
    SourceSlot::loaded(source, items).with_updated_at(updated_at)
}

/// Workers write `str(time.time())`, i.e. fractional epoch seconds as text.
fn parse_updated_at(v: &Value) -> Option<DateTime<Utc>> {
    let secs = match v {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis((secs * 1_000.0) as i64)
}

/// Read and settle a single source. One attempt, no retry.
pub async fn fetch_source(store: &dyn TrendStore, table: &str, source: Source) -> SourceSlot {
    let t0 = Instant::now();
    let read = store
        .get(table, source.key())
        .await
        .with_context(|| format!("reading '{}' from table '{}' via {}", source.key(), table, store.name()));
    let slot = settle(source, read);

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("trends_fetch_ms", "source" => source.key()).record(ms);
    counter!(
        "trends_fetch_total",
        "source" => source.key(),
        "status" => slot.status.as_str()
    )
    .increment(1);
    slot
}

/// Fan out one read per source, wait for all six to settle, and assemble the board.
pub async fn fetch_board(store: &dyn TrendStore, table: &str) -> TrendBoard {
    ensure_metrics_described();

    let (youtube, tiktok, google, wiki, hn, github) = tokio::join!(
        fetch_source(store, table, Source::Youtube),
        fetch_source(store, table, Source::Tiktok),
        fetch_source(store, table, Source::GoogleTrends),
        fetch_source(store, table, Source::Wikipedia),
        fetch_source(store, table, Source::HackerNews),
        fetch_source(store, table, Source::Github),
    );

    let board = [youtube, tiktok, google, wiki, hn, github]
        .into_iter()
        .fold(TrendBoard::empty(Utc::now()), TrendBoard::with_slot);

    tracing::info!(
        target: "trends",
        loaded = board
            .slots()
            .iter()
            .filter(|s| !s.items.is_empty())
            .count(),
        "fetch cycle settled"
    );
    board
}
