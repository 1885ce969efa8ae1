use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::Date;

pub mod derive;
pub mod filter;
pub mod group;

pub use derive::{derive_categories, derive_week_buckets, week_start, WeekBucket};
pub use filter::{filter, FilterCriteria, WeekFilter};
pub use group::{group_by_month, MonthGroup};

/// Lifecycle stage of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Status {
    #[serde(rename = "GA")]
    #[strum(serialize = "GA")]
    Ga,
    Preview,
    Deprecated,
    Retired,
    New,
}

/// One product-update announcement.
///
/// Feeds are expected to be well formed: `categories` is non-empty and
/// `date` is a valid calendar date. Enforcing that is the feed producer's
/// responsibility; past the serde boundary nothing here re-validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub status: Status,
    pub date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Sole owner of the update collection for the lifetime of a session.
///
/// Derived views (category list, week buckets, filtered subsets, month
/// groups) are always recomputed from the records held here, never mutated
/// independently. The store preserves the order it was given; [`load_feed`]
/// hands it date-descending input.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<UpdateRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<UpdateRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[UpdateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&UpdateRecord> {
        self.records.get(index)
    }
}

/// Reads a JSON feed and orders it newest-first.
///
/// The sort is stable, so records sharing a date keep their feed order and
/// downstream month grouping sees chronologically ordered input.
pub fn load_feed(path: &Path) -> Result<Vec<UpdateRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading feed {}", path.display()))?;
    let mut records: Vec<UpdateRecord> =
        serde_json::from_str(&raw).with_context(|| format!("parsing feed {}", path.display()))?;
    records.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(records)
}
