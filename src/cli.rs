use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::convert::Infallible;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "burndown", version, about = "Sprint burndown datasets from daily snapshots")]
pub struct Cli {
    /// Workspace holding `.burndown/` state and the output directory
    #[arg(long, short = 'w', env = "BURNDOWN_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load sprints, backlog stories and snapshots from a JSON export
    Import {
        file: PathBuf,
    },
    /// Tally the backlog and append today's snapshot
    Record {
        #[arg(long)]
        sprint: Option<String>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Build the chart datasets for the renderer
    Chart {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Record today's snapshot, then build the chart datasets
    Run {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the effective workspace settings, or update them with `--set`
    Settings {
        /// `key=value` pair; the value is read as JSON, falling back to a plain string
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_setting)]
        set: Vec<(String, Value)>,
    },
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Sprint name; defaults to the sprint with the latest start date
    #[arg(long)]
    pub sprint: Option<String>,
    /// Override the current day (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,
    /// Show weekends as flat steps (`true`) or drop them (`false`)
    #[arg(long, env = "INCLUDE_WEEKENDS", value_parser = parse_include_weekends)]
    pub include_weekends: Option<bool>,
}

/// Anything but an explicit `false` keeps weekends on the chart.
fn parse_include_weekends(raw: &str) -> Result<bool, Infallible> {
    Ok(raw.trim() != "false")
}

fn parse_setting(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing setting name in {raw:?}"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
