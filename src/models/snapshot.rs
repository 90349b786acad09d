use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One stored daily record for a sprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub points_remaining: f64,
    pub progress_percent: f64, // 0.0..=1.0
    /// Unix seconds at which the record was written, used to order same-day records.
    #[serde(default)]
    pub recorded_at: Option<i64>,
}

impl Snapshot {
    pub fn new(date: NaiveDate, points_remaining: f64, progress_percent: f64) -> Self {
        Self {
            date,
            points_remaining,
            progress_percent,
            recorded_at: None,
        }
    }
}

/// A `daily_summary` row as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: i64,
    pub sprint: String,
    pub snapshot: Snapshot,
}
