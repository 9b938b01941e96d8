use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::trends::types::{RawRecord, TrendStore};

/// In-process trend table. Backs tests and local runs from a fixture file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: String,
    records: HashMap<String, RawRecord>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Store `items` as the record's `data` list.
    pub fn with_items(mut self, key: &str, items: Value) -> Self {
        let mut rec = RawRecord::new();
        rec.insert("source".into(), Value::String(key.to_string()));
        rec.insert("data".into(), items);
        self.records.insert(key.to_string(), rec);
        self
    }

    pub fn with_record(mut self, key: &str, record: RawRecord) -> Self {
        self.records.insert(key.to_string(), record);
        self
    }

    /// Every read of `key` fails with `message`.
    pub fn with_failure(mut self, key: &str, message: &str) -> Self {
        self.failures.insert(key.to_string(), message.to_string());
        self
    }

    /// Reads of `key` take `delay` before answering.
    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    /// Total reads served (including failed ones).
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Load a fixture: a JSON object keyed by source key, each value either a full
    /// record (`{"data": [...], "updated_at": "..."}`) or a bare item list.
    pub fn from_fixture_str(table: impl Into<String>, s: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(s).context("parsing trend fixture")?;
        let Value::Object(entries) = root else {
            bail!("trend fixture must be a JSON object keyed by source");
        };

        let mut store = Self::new(table);
        for (key, v) in entries {
            store = match v {
                Value::Object(rec) => store.with_record(&key, rec),
                list @ Value::Array(_) => store.with_items(&key, list),
                other => {
                    return Err(anyhow!(
                        "fixture entry '{key}' must be an object or a list, got {other}"
                    ))
                }
            };
        }
        Ok(store)
    }

    pub fn from_fixture_path(table: impl Into<String>, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading trend fixture from {}", path.display()))?;
        Self::from_fixture_str(table, &content)
    }
}

#[async_trait]
impl TrendStore for MemoryStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<RawRecord>> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(msg) = self.failures.get(key) {
            bail!("{msg}");
        }
        if table != self.table {
            bail!("table '{table}' not found");
        }
        Ok(self.records.get(key).cloned())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
