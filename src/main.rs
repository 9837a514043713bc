mod config;
mod database;
mod models;
mod seeds;
mod utils;

use clap::{Parser, Subcommand};
use config::SeedConfig;
use database::MongoDB;
use dotenv::dotenv;
use seeds::VerifyReport;
use std::process::ExitCode;
use utils::SeedError;

#[derive(Parser, Debug)]
#[command(version, about = "Seeds the recipes_app MongoDB database with sample users and recipes")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Drop the collections, insert the sample data, create indexes and verify
    Seed,
    /// Only drop the users, recipes, saves and comments collections
    Reset,
    /// Check the current database against the sample data
    Verify {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_level));

    match run(cli.command.unwrap_or(Commands::Seed)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), SeedError> {
    let config = SeedConfig::from_env()?;
    let db = MongoDB::connect(&config).await?;

    match command {
        Commands::Seed => {
            log::info!("🌱 Seeding {}...", config.database);
            let summary = seeds::seed_database(&db, &config).await?;
            for (username, id) in &summary.users {
                log::info!("   👤 {} -> {}", username, id.to_hex());
            }

            let report = seeds::verify_database(&db, &config.database).await?;
            log_report(&report);
            report.into_result()?;
            log::info!("✅ Seed complete: {} users, {} recipes", summary.users.len(), summary.recipes_inserted);
        }
        Commands::Reset => db.reset().await?,
        Commands::Verify { json } => {
            let report = seeds::verify_database(&db, &config.database).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                log_report(&report);
            }
            report.into_result()?;
        }
    }

    Ok(())
}

fn log_report(report: &VerifyReport) {
    let counts: Vec<String> = report
        .counts
        .iter()
        .map(|(name, count)| format!("{}={}", name, count))
        .collect();
    log::info!("📊 {} at {}: {}", report.database, report.checked_at.to_rfc3339(), counts.join(" "));

    let passed = report.checks.iter().filter(|c| c.passed).count();
    log::info!("🔍 {}/{} checks passed, {} warnings", passed, report.checks.len(), report.warnings.len());
}
