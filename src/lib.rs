pub mod analysis;
pub mod cli;
pub mod commands;
pub mod models;

use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use commands::{
    burndown::{generate_burndown, record_daily_summary, run_burndown, BurndownOptions},
    import::import_workspace_data,
    settings::{get_settings, save_settings},
};

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let workspace = cli.workspace.to_string_lossy().to_string();
    let today = |override_day: Option<chrono::NaiveDate>| {
        override_day.unwrap_or_else(|| chrono::Local::now().date_naive())
    };

    let output = match cli.command {
        Commands::Import { file } => {
            let summary = import_workspace_data(workspace, file.to_string_lossy().to_string())
                .await
                .map_err(anyhow::Error::msg)?;
            serde_json::to_value(summary)?
        }
        Commands::Record { sprint, today: day } => {
            let row = record_daily_summary(workspace, sprint, today(day))
                .await
                .map_err(anyhow::Error::msg)?;
            serde_json::to_value(row)?
        }
        Commands::Chart { run } => {
            let report = generate_burndown(workspace, options(run, today))
                .await
                .map_err(anyhow::Error::msg)?;
            serde_json::to_value(report)?
        }
        Commands::Run { run } => {
            let report = run_burndown(workspace, options(run, today))
                .await
                .map_err(anyhow::Error::msg)?;
            serde_json::to_value(report)?
        }
        Commands::Settings { set } if set.is_empty() => {
            get_settings(workspace).await.map_err(anyhow::Error::msg)?
        }
        Commands::Settings { set } => {
            let updates: serde_json::Map<String, serde_json::Value> = set.into_iter().collect();
            save_settings(workspace, serde_json::Value::Object(updates))
                .await
                .map_err(anyhow::Error::msg)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn options(args: RunArgs, today: impl Fn(Option<chrono::NaiveDate>) -> chrono::NaiveDate) -> BurndownOptions {
    BurndownOptions {
        sprint: args.sprint,
        today: today(args.today),
        include_weekends: args.include_weekends,
    }
}
