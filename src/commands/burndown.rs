use crate::analysis::backlog::count_points_left;
use crate::analysis::calendar::count_weekdays;
use crate::analysis::ideal::generate_ideal;
use crate::analysis::labels::chart_labels;
use crate::analysis::series::{reconstruct, SeriesDiagnostic};
use crate::analysis::BurndownError;
use crate::commands::db;
use crate::commands::settings::{load_effective_settings, EffectiveBurndownSettings};
use crate::models::chart::{BurndownReport, ChartDatasets};
use crate::models::snapshot::{DailySummary, Snapshot};
use crate::models::sprint::Sprint;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs;

/// Per-run overrides on top of the workspace settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurndownOptions {
    pub sprint: Option<String>,
    pub today: NaiveDate,
    pub include_weekends: Option<bool>,
}

impl BurndownOptions {
    pub fn for_today(today: NaiveDate) -> Self {
        Self {
            sprint: None,
            today,
            include_weekends: None,
        }
    }
}

pub async fn record_daily_summary(
    workspace_path: String,
    sprint: Option<String>,
    today: NaiveDate,
) -> Result<DailySummary, String> {
    record_daily_summary_internal(&workspace_path, sprint.as_deref(), today)
}

pub fn record_daily_summary_internal(
    workspace_path: &str,
    sprint: Option<&str>,
    today: NaiveDate,
) -> Result<DailySummary, String> {
    let settings = load_effective_settings(workspace_path)?;
    let conn = db::get_db_connection(workspace_path)
        .map_err(|e| format!("DB error: {e}"))?;
    let sprint = resolve_sprint(&conn, sprint)?;

    let stories = db::load_sprint_stories(&conn, &sprint.name)
        .map_err(|e| format!("Query error: {e}"))?;
    let tally = count_points_left(&stories, &sprint.name, &settings.status_exclude, &settings.story_type);
    log::info!(
        "{}",
        serde_json::json!({
            "message": "Counted points left in sprint",
            "sprint": sprint.name,
            "pointsLeftInSprint": tally.points_left,
            "progressNow": tally.progress,
            "stories": tally.story_count,
        })
    );

    let snapshot = Snapshot {
        date: today,
        points_remaining: tally.points_left,
        progress_percent: tally.progress,
        recorded_at: Some(chrono::Utc::now().timestamp()),
    };
    let id = db::insert_daily_summary(&conn, &sprint.name, &snapshot)
        .map_err(|e| format!("Insert error: {e}"))?;
    log::info!(
        "{}",
        serde_json::json!({ "message": "Updated daily summary table", "sprint": sprint.name, "id": id })
    );

    Ok(DailySummary {
        id,
        sprint: sprint.name,
        snapshot,
    })
}

pub async fn generate_burndown(workspace_path: String, options: BurndownOptions) -> Result<BurndownReport, String> {
    generate_burndown_internal(&workspace_path, &options)
}

pub fn generate_burndown_internal(workspace_path: &str, options: &BurndownOptions) -> Result<BurndownReport, String> {
    let settings = load_effective_settings(workspace_path)?;
    let conn = db::get_db_connection(workspace_path)
        .map_err(|e| format!("DB error: {e}"))?;
    let sprint = resolve_sprint(&conn, options.sprint.as_deref())?;
    log::info!(
        "{}",
        serde_json::json!({
            "message": "Found latest sprint",
            "sprint": sprint.name,
            "start": sprint.start,
            "end": sprint.end,
        })
    );

    let snapshots: Vec<Snapshot> = db::load_sprint_snapshots(&conn, &sprint.name)
        .map_err(|e| format!("Query error: {e}"))?
        .into_iter()
        .map(|row| row.snapshot)
        .collect();

    let include_weekends = options.include_weekends.unwrap_or(settings.include_weekends);
    let (datasets, diagnostics) = build_chart_datasets(&sprint, &snapshots, options.today, include_weekends)
        .map_err(|e| format!("Burndown error: {e}"))?;
    log_diagnostics(&diagnostics);

    let written_files = write_datasets(&settings, &datasets)?;
    log::info!(
        "{}",
        serde_json::json!({
            "message": "Generated burndown datasets",
            "sprint": datasets.sprint,
            "labels": datasets.labels,
            "data": datasets.points_left_by_day,
            "idealBurndown": datasets.ideal_burndown,
        })
    );

    Ok(BurndownReport {
        datasets,
        written_files,
        warning_count: diagnostics.len(),
    })
}

/// Records today's snapshot, then rebuilds the chart datasets including it.
pub async fn run_burndown(workspace_path: String, options: BurndownOptions) -> Result<BurndownReport, String> {
    record_daily_summary_internal(&workspace_path, options.sprint.as_deref(), options.today)?;
    generate_burndown_internal(&workspace_path, &options)
}

/// Composes the actual series, the ideal line and the labels for one sprint.
///
/// The ideal line starts from the first value of the actual series, so a
/// sprint without a day-0 recording starts its ideal line at zero.
pub fn build_chart_datasets(
    sprint: &Sprint,
    snapshots: &[Snapshot],
    today: NaiveDate,
    include_weekends: bool,
) -> Result<(ChartDatasets, Vec<SeriesDiagnostic>), BurndownError> {
    let cycle = sprint.cycle(include_weekends)?;
    let series = reconstruct(snapshots, cycle.start, today, cycle.include_weekends);

    let num_weekdays = count_weekdays(cycle.start, cycle.last_full_day());
    let initial_points = series.points_remaining_by_day.first().copied().unwrap_or_default();
    let ideal = generate_ideal(
        cycle.start,
        cycle.end,
        initial_points,
        num_weekdays,
        cycle.include_weekends,
    )?;
    let labels = chart_labels(ideal.len().max(series.len()));

    let datasets = ChartDatasets {
        sprint: sprint.name.clone(),
        generated_on: today,
        include_weekends: cycle.include_weekends,
        labels,
        points_left_by_day: series.points_remaining_by_day,
        ideal_burndown: ideal,
        progress_by_day: series.progress_by_day,
        demo: sprint.demo,
        goal: sprint.goal.clone(),
    };

    Ok((datasets, series.diagnostics))
}

fn resolve_sprint(conn: &Connection, name: Option<&str>) -> Result<Sprint, String> {
    let found = match name {
        Some(name) => db::load_sprint(conn, name),
        None => db::load_latest_sprint(conn),
    }
    .map_err(|e| format!("Query error: {e}"))?;

    found.ok_or_else(|| match name {
        Some(name) => format!("Sprint not found: {name}"),
        None => "No sprints found. Import sprint data first.".to_string(),
    })
}

fn log_diagnostics(diagnostics: &[SeriesDiagnostic]) {
    for diagnostic in diagnostics {
        let message = match diagnostic {
            SeriesDiagnostic::OutOfRange { .. } => "Discarded entry before sprint start",
            SeriesDiagnostic::AfterToday { .. } => "Discarded entry after today",
            SeriesDiagnostic::DuplicateDay { .. } => "Found duplicate entry",
        };
        log::warn!(
            "{}",
            serde_json::json!({ "message": message, "entry": diagnostic })
        );
    }
}

fn write_datasets(settings: &EffectiveBurndownSettings, datasets: &ChartDatasets) -> Result<Vec<String>, String> {
    let dir = &settings.output_dir;
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;

    let raw = serde_json::to_string_pretty(datasets)
        .map_err(|e| format!("Failed to serialize datasets: {e}"))?;

    let stamp = chrono::Utc::now().timestamp_millis();
    let prefix = format!("sprint{}", datasets.sprint);
    let mut written = Vec::with_capacity(2);
    for name in [format!("{prefix}-{stamp}.json"), format!("{prefix}-latest.json")] {
        let path = dir.join(name);
        fs::write(&path, &raw)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        written.push(path.to_string_lossy().to_string());
    }

    Ok(written)
}
