// src/trends/types.rs
use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sources::Source;

/// One stored record as a JSON object (`data`, `updated_at`, ...).
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A popularity metric: workers write raw counts, some sources pre-format text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Metric {
    /// False for zero, NaN and empty text; a set-but-falsy value counts as unset.
    pub fn is_set(&self) -> bool {
        match self {
            Metric::Int(n) => *n != 0,
            Metric::Float(f) => *f != 0.0 && !f.is_nan(),
            Metric::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Int(n) => write!(f, "{n}"),
            Metric::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 => {
                write!(f, "{x:.0}")
            }
            Metric::Float(x) => write!(f, "{x}"),
            Metric::Text(s) => f.write_str(s),
        }
    }
}

/// One displayable entry. Each source fills a different subset of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stars: Option<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<Metric>,
}

impl TrendItem {
    /// Explicit rank as written when set, else the 1-based position.
    pub fn rank_label(&self, position: usize) -> String {
        match self.rank.as_ref().filter(|r| r.is_set()) {
            Some(rank) => rank.to_string(),
            None => position.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// Record read and decoded (possibly with zero items).
    Loaded,
    /// No record, or a record without `data`.
    Absent,
    /// Store fault or undecodable payload.
    Failed,
}

impl SlotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Loaded => "loaded",
            SlotStatus::Absent => "absent",
            SlotStatus::Failed => "failed",
        }
    }
}

/// Normalized result of one source read within a fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSlot {
    pub source: Source,
    pub status: SlotStatus,
    pub updated_at: Option<DateTime<Utc>>,
    pub items: Vec<TrendItem>,
}

impl SourceSlot {
    pub fn loaded(source: Source, items: Vec<TrendItem>) -> Self {
        Self {
            source,
            status: SlotStatus::Loaded,
            updated_at: None,
            items,
        }
    }

    pub fn absent(source: Source) -> Self {
        Self {
            source,
            status: SlotStatus::Absent,
            updated_at: None,
            items: Vec::new(),
        }
    }

    pub fn failed(source: Source) -> Self {
        Self {
            source,
            status: SlotStatus::Failed,
            updated_at: None,
            items: Vec::new(),
        }
    }

    pub fn with_updated_at(mut self, ts: Option<DateTime<Utc>>) -> Self {
        self.updated_at = ts;
        self
    }
}

/// All six slots of one fetch cycle, in `Source::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendBoard {
    pub generated_at: DateTime<Utc>,
    slots: Vec<SourceSlot>,
}

impl TrendBoard {
    /// Board where every source is absent.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            slots: Source::ALL.into_iter().map(SourceSlot::absent).collect(),
        }
    }

    /// Replace the slot for `slot.source`.
    pub fn with_slot(mut self, slot: SourceSlot) -> Self {
        let i = slot.source.index();
        self.slots[i] = slot;
        self
    }

    pub fn slot(&self, source: Source) -> &SourceSlot {
        &self.slots[source.index()]
    }

    pub fn items(&self, source: Source) -> &[TrendItem] {
        &self.slot(source).items
    }

    pub fn slots(&self) -> &[SourceSlot] {
        &self.slots
    }
}

#[async_trait::async_trait]
pub trait TrendStore: Send + Sync {
    /// Point read by partition key. `Ok(None)` when no record exists.
    async fn get(&self, table: &str, key: &str) -> Result<Option<RawRecord>>;
    fn name(&self) -> &'static str;
}
