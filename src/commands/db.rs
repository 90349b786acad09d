use crate::models::snapshot::{DailySummary, Snapshot};
use crate::models::sprint::Sprint;
use crate::models::story::Story;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use std::fs;
use std::path::Path;

const DB_SCHEMA_VERSION: i64 = 2;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Future schema; do not fail reads/writes for forward-compatible changes.
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sprints (
            name TEXT PRIMARY KEY,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            demo_date TEXT,
            goal TEXT
        );

        CREATE TABLE IF NOT EXISTS backlog_stories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            sprint TEXT NOT NULL,
            status TEXT,
            story_type TEXT NOT NULL DEFAULT 'Story',
            estimate REAL,
            progress REAL
        );

        CREATE TABLE IF NOT EXISTS daily_summary (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sprint TEXT NOT NULL,
            date TEXT NOT NULL,
            points REAL NOT NULL,
            progress REAL NOT NULL DEFAULT 0
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> Result<()> {
    add_column_if_missing(conn, "daily_summary", "recorded_at INTEGER")?;

    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_daily_summary_sprint_date ON daily_summary(sprint, date);
        CREATE INDEX IF NOT EXISTS idx_backlog_stories_sprint ON backlog_stories(sprint);
        CREATE INDEX IF NOT EXISTS idx_sprints_start ON sprints(start_date);
        ",
    )
}

fn add_column_if_missing(conn: &Connection, table: &str, column_def: &str) -> Result<()> {
    let column_name = column_def
        .split_whitespace()
        .next()
        .unwrap_or(column_def)
        .to_string();

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|res| res.ok())
        .any(|name| name == column_name);

    if !exists {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column_def}"), [])?;
    }

    Ok(())
}

pub fn get_db_connection(workspace_path: &str) -> Result<Connection> {
    let state_dir = Path::new(workspace_path).join(".burndown");
    fs::create_dir_all(&state_dir).map_err(|_| rusqlite::Error::InvalidPath(state_dir.clone()))?;
    let conn = Connection::open(state_dir.join("state.db"))?;
    initialize_schema(&conn)?;
    Ok(conn)
}

pub fn upsert_sprint(conn: &Connection, sprint: &Sprint) -> Result<()> {
    conn.execute(
        "
        INSERT INTO sprints (name, start_date, end_date, demo_date, goal)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(name) DO UPDATE SET
            start_date = excluded.start_date,
            end_date = excluded.end_date,
            demo_date = excluded.demo_date,
            goal = excluded.goal
        ",
        params![sprint.name, sprint.start, sprint.end, sprint.demo, sprint.goal],
    )?;
    Ok(())
}

fn sprint_from_row(row: &Row<'_>) -> Result<Sprint> {
    Ok(Sprint {
        name: row.get(0)?,
        start: row.get(1)?,
        end: row.get(2)?,
        demo: row.get(3)?,
        goal: row.get(4)?,
    })
}

/// The sprint with the most recent start date.
pub fn load_latest_sprint(conn: &Connection) -> Result<Option<Sprint>> {
    conn.query_row(
        "SELECT name, start_date, end_date, demo_date, goal FROM sprints ORDER BY start_date DESC, name DESC LIMIT 1",
        [],
        sprint_from_row,
    )
    .optional()
}

pub fn load_sprint(conn: &Connection, name: &str) -> Result<Option<Sprint>> {
    conn.query_row(
        "SELECT name, start_date, end_date, demo_date, goal FROM sprints WHERE name = ?1",
        params![name],
        sprint_from_row,
    )
    .optional()
}

pub fn upsert_stories(conn: &Connection, stories: &[Story]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for story in stories {
        tx.execute(
            "
            INSERT INTO backlog_stories (id, name, sprint, status, story_type, estimate, progress)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                sprint = excluded.sprint,
                status = excluded.status,
                story_type = excluded.story_type,
                estimate = excluded.estimate,
                progress = excluded.progress
            ",
            params![
                story.id,
                story.name,
                story.sprint,
                story.status,
                story.story_type,
                story.estimate,
                story.progress,
            ],
        )?;
    }
    tx.commit()
}

pub fn load_sprint_stories(conn: &Connection, sprint: &str) -> Result<Vec<Story>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, sprint, status, story_type, estimate, progress FROM backlog_stories WHERE sprint = ?1 ORDER BY id ASC",
    )?;

    let stories = stmt
        .query_map(params![sprint], |row| {
            Ok(Story {
                id: row.get(0)?,
                name: row.get(1)?,
                sprint: row.get(2)?,
                status: row.get(3)?,
                story_type: row.get(4)?,
                estimate: row.get(5)?,
                progress: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(stories)
}

/// Appends a daily record. Existing rows are never updated.
pub fn insert_daily_summary(conn: &Connection, sprint: &str, snapshot: &Snapshot) -> Result<i64> {
    conn.execute(
        "INSERT INTO daily_summary (sprint, date, points, progress, recorded_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            sprint,
            snapshot.date,
            snapshot.points_remaining,
            snapshot.progress_percent,
            snapshot.recorded_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Snapshots for a sprint, oldest day first and insertion order within a day.
pub fn load_sprint_snapshots(conn: &Connection, sprint: &str) -> Result<Vec<DailySummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, sprint, date, points, progress, recorded_at FROM daily_summary WHERE sprint = ?1 ORDER BY date ASC, id ASC",
    )?;

    let rows = stmt
        .query_map(params![sprint], |row| {
            let date: NaiveDate = row.get(2)?;
            Ok(DailySummary {
                id: row.get(0)?,
                sprint: row.get(1)?,
                snapshot: Snapshot {
                    date,
                    points_remaining: row.get(3)?,
                    progress_percent: row.get(4)?,
                    recorded_at: row.get(5)?,
                },
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(rows)
}

pub async fn take_snapshot(
    workspace_path: String,
    sprint: String,
    date: NaiveDate,
    points_remaining: f64,
    progress_percent: f64,
) -> Result<DailySummary, String> {
    let conn = get_db_connection(&workspace_path)
        .map_err(|e| format!("DB error: {e}"))?;

    let snapshot = Snapshot {
        date,
        points_remaining,
        progress_percent,
        recorded_at: Some(chrono::Utc::now().timestamp()),
    };

    let id = insert_daily_summary(&conn, &sprint, &snapshot)
        .map_err(|e| format!("Insert error: {e}"))?;

    Ok(DailySummary {
        id,
        sprint,
        snapshot,
    })
}

pub async fn get_sprint_snapshots(workspace_path: String, sprint: String) -> Result<Vec<DailySummary>, String> {
    let conn = get_db_connection(&workspace_path)
        .map_err(|e| format!("DB error: {e}"))?;

    load_sprint_snapshots(&conn, &sprint).map_err(|e| format!("Query error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn open() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        initialize_schema(&conn).expect("schema init");
        conn
    }

    #[test]
    fn schema_initializes_with_expected_version() {
        let conn = open();
        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .expect("schema version");
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn latest_sprint_is_the_most_recent_start() {
        let conn = open();
        for (name, start, end) in [("11", 1, 12), ("12", 15, 26)] {
            upsert_sprint(
                &conn,
                &Sprint {
                    name: name.to_string(),
                    start: date(2024, 1, start),
                    end: date(2024, 1, end),
                    demo: None,
                    goal: Some(format!("Goal {name}")),
                },
            )
            .expect("upsert sprint");
        }

        let latest = load_latest_sprint(&conn).expect("query").expect("sprint exists");
        assert_eq!(latest.name, "12");
        assert_eq!(latest.start, date(2024, 1, 15));
        assert_eq!(latest.goal.as_deref(), Some("Goal 12"));
        assert!(load_sprint(&conn, "13").expect("query").is_none());
    }

    #[test]
    fn snapshots_load_in_day_then_insertion_order() {
        let conn = open();
        insert_daily_summary(&conn, "12", &Snapshot::new(date(2024, 1, 2), 15.0, 0.2)).expect("insert");
        insert_daily_summary(&conn, "12", &Snapshot::new(date(2024, 1, 1), 20.0, 0.0)).expect("insert");
        insert_daily_summary(&conn, "12", &Snapshot::new(date(2024, 1, 2), 14.0, 0.3)).expect("insert");
        insert_daily_summary(&conn, "11", &Snapshot::new(date(2024, 1, 2), 99.0, 0.9)).expect("insert");

        let rows = load_sprint_snapshots(&conn, "12").expect("load");
        let points: Vec<f64> = rows.iter().map(|r| r.snapshot.points_remaining).collect();
        assert_eq!(points, vec![20.0, 15.0, 14.0]);
        assert!(rows.iter().all(|r| r.sprint == "12"));
    }

    #[test]
    fn story_upsert_replaces_existing_rows() {
        let conn = open();
        let mut story = Story {
            id: "s-1".to_string(),
            name: "Login".to_string(),
            sprint: "12".to_string(),
            status: Some("Todo".to_string()),
            story_type: "Story".to_string(),
            estimate: Some(3.0),
            progress: None,
        };
        upsert_stories(&conn, std::slice::from_ref(&story)).expect("insert story");
        story.status = Some("Done".to_string());
        upsert_stories(&conn, std::slice::from_ref(&story)).expect("update story");

        let stories = load_sprint_stories(&conn, "12").expect("load stories");
        assert_eq!(stories, vec![story]);
    }
}
