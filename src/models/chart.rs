use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Datasets handed to the chart renderer. `labels` is never shorter than any series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatasets {
    pub sprint: String,
    pub generated_on: NaiveDate,
    pub include_weekends: bool,
    pub labels: Vec<usize>,
    pub points_left_by_day: Vec<f64>,
    pub ideal_burndown: Vec<f64>,
    pub progress_by_day: Vec<f64>,
    pub demo: Option<NaiveDate>,
    pub goal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurndownReport {
    pub datasets: ChartDatasets,
    pub written_files: Vec<String>,
    pub warning_count: usize,
}
