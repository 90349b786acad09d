use crate::commands::db;
use crate::models::snapshot::Snapshot;
use crate::models::sprint::Sprint;
use crate::models::story::Story;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A snapshot row as it appears in an import document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedSnapshot {
    pub sprint: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// Sprints, backlog stories and daily snapshots exported from the planning board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub snapshots: Vec<ImportedSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub sprints: usize,
    pub stories: usize,
    pub snapshots: usize,
}

pub async fn import_workspace_data(workspace_path: String, file: String) -> Result<ImportSummary, String> {
    let raw = std::fs::read_to_string(Path::new(&file))
        .map_err(|e| format!("Failed to read {file}: {e}"))?;
    let document: ImportDocument = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse {file}: {e}"))?;

    import_document(&workspace_path, &document)
}

pub fn import_document(workspace_path: &str, document: &ImportDocument) -> Result<ImportSummary, String> {
    let conn = db::get_db_connection(workspace_path)
        .map_err(|e| format!("DB error: {e}"))?;

    for sprint in &document.sprints {
        if sprint.end < sprint.start {
            return Err(format!(
                "Sprint {} has invalid bounds: {} .. {}",
                sprint.name, sprint.start, sprint.end
            ));
        }
        db::upsert_sprint(&conn, sprint).map_err(|e| format!("Sprint upsert error: {e}"))?;
    }

    db::upsert_stories(&conn, &document.stories)
        .map_err(|e| format!("Story upsert error: {e}"))?;

    // Rows without a write time are stamped now so they order after earlier recordings.
    let imported_at = chrono::Utc::now().timestamp();
    for row in &document.snapshots {
        let snapshot = Snapshot {
            recorded_at: row.snapshot.recorded_at.or(Some(imported_at)),
            ..row.snapshot.clone()
        };
        db::insert_daily_summary(&conn, &row.sprint, &snapshot)
            .map_err(|e| format!("Insert error: {e}"))?;
    }

    let summary = ImportSummary {
        sprints: document.sprints.len(),
        stories: document.stories.len(),
        snapshots: document.snapshots.len(),
    };
    log::info!(
        "{}",
        serde_json::json!({ "message": "Imported workspace data", "summary": summary })
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flattened_snapshots_with_defaults() {
        let document: ImportDocument = serde_json::from_str(
            r#"{
                "snapshots": [
                    { "sprint": "12", "date": "2024-01-02", "points_remaining": 14, "progress_percent": 0.3 }
                ]
            }"#,
        )
        .expect("parse document");

        assert!(document.sprints.is_empty());
        assert_eq!(document.snapshots.len(), 1);
        assert_eq!(document.snapshots[0].sprint, "12");
        assert_eq!(document.snapshots[0].snapshot.points_remaining, 14.0);
        assert_eq!(document.snapshots[0].snapshot.recorded_at, None);
    }
}
