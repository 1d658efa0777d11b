use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use gas_gauge::{
    config::{self, AppConfig},
    db::{self, DbPool},
    services::{seed, GaugeService},
};

#[derive(Parser)]
#[command(
    name = "gas-gauge-admin",
    about = "Maintenance commands for the gas gauge database",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[arg(
        long,
        global = true,
        help = "SQLite URL to operate on; defaults to the loaded configuration"
    )]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Create the predefined canister types if missing
    Seed,
    /// Drop every table, re-create the schema and seed it
    Reset {
        #[arg(long, action = ArgAction::SetTrue, help = "Confirm that all data will be lost")]
        yes: bool,
    },
    /// Print every canister with its latest reading
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config().context("failed to load configuration")?;
    if let Some(url) = cli.database_url.clone() {
        cfg.database_url = url;
    }
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let pool = connect(&cfg).await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&pool).await?;
            println!("Migrations applied to {}", cfg.database_url());
        }
        Commands::Seed => {
            let pool = Arc::new(pool);
            db::run_migrations(&pool).await?;
            let report = seed_types(pool).await?;
            report_seed(&report, cli.json)?;
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("refusing to reset {} without --yes", cfg.database_url());
            }
            db::reset_schema(&pool).await?;
            let report = seed_types(Arc::new(pool)).await?;
            println!("Schema recreated");
            report_seed(&report, cli.json)?;
        }
        Commands::Status => {
            let pool = Arc::new(pool);
            let dashboard = GaugeService::new(pool)
                .dashboard_view()
                .await
                .context("failed to load canisters")?;

            if cli.json {
                print_json(&dashboard.canisters)?;
            } else if dashboard.canisters.is_empty() {
                println!("No canisters yet");
            } else {
                for summary in &dashboard.canisters {
                    let remaining = summary
                        .remaining_percentage
                        .map(|pct| format!("{:.1}%", pct))
                        .unwrap_or_else(|| "no weighings".to_string());
                    let type_name = summary
                        .canister_type
                        .as_ref()
                        .map(|t| t.name.as_str())
                        .unwrap_or("unknown type");
                    println!(
                        "- {} ({}) • {} • {} • {}",
                        summary.canister.label,
                        summary.canister.id,
                        type_name,
                        remaining,
                        summary.status_class
                    );
                }
            }
        }
    }

    Ok(())
}

async fn connect(cfg: &AppConfig) -> Result<DbPool> {
    db::ensure_sqlite_parent_dir(cfg.database_url())
        .context("failed to create the database directory")?;
    db::establish_connection_from_app_config(cfg)
        .await
        .with_context(|| format!("failed to open {}", cfg.database_url()))
}

async fn seed_types(pool: Arc<DbPool>) -> Result<seed::SeedReport> {
    let service = GaugeService::new(pool);
    seed::seed_canister_types(service.canister_types())
        .await
        .context("failed to seed canister types")
}

fn report_seed(report: &seed::SeedReport, json: bool) -> Result<()> {
    if json {
        #[derive(Serialize)]
        struct Output {
            created: usize,
            existing: usize,
        }
        return print_json(&Output {
            created: report.created,
            existing: report.existing,
        });
    }
    println!(
        "Seeded canister types: {} created, {} already present",
        report.created, report.existing
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
