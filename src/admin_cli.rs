// src/admin_cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::database::{DatabaseConfig, StatsRepository};
use crate::environment::EnvironmentConfig;
use crate::import::{import_jobs, RawJob};
use crate::scoring::ScoreCategory;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Track scraped job postings, applications and interviews")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server (default when no command is given)
    Serve,
    /// Create the database and run migrations
    Init,
    /// Import scraped jobs from a JSON file (defaults to the configured
    /// merged scraper output)
    Import { file: Option<PathBuf> },
    /// Print pipeline statistics
    Stats,
}

pub async fn handle_command(command: Command, environment: &EnvironmentConfig) -> Result<()> {
    let mut db_config = DatabaseConfig::new(environment.database_path.clone());
    db_config.init_pool().await?;
    db_config.migrate().await?;
    let pool = db_config.pool()?;

    match command {
        Command::Serve => anyhow::bail!("serve is handled by the server entry point"),

        Command::Init => {
            println!("✓ Database ready at {}", environment.database_path.display());
        }

        Command::Import { file } => {
            let path = file.unwrap_or_else(|| environment.merged_jobs_path.clone());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read jobs file: {}", path.display()))?;
            let raw_jobs: Vec<RawJob> = serde_json::from_str(&content)
                .with_context(|| format!("Jobs file is not valid JSON: {}", path.display()))?;

            if raw_jobs.is_empty() {
                println!("❌ No jobs found in {}", path.display());
                return Ok(());
            }

            let summary = import_jobs(pool, raw_jobs).await?;
            println!(
                "✓ Imported {} jobs ({} skipped as duplicates, {} of {} total)",
                summary.imported,
                summary.skipped,
                summary.imported + summary.skipped,
                summary.total
            );
            for error in &summary.errors {
                println!("  ❌ {}", error);
            }
        }

        Command::Stats => {
            let stats = StatsRepository::new(pool).collect().await?;
            println!("Jobs tracked:        {}", stats.total_jobs);
            println!("Score distribution:");
            for (category, count) in [
                (ScoreCategory::Priority, stats.by_score.priority),
                (ScoreCategory::High, stats.by_score.high),
                (ScoreCategory::Good, stats.by_score.good),
                (ScoreCategory::Low, stats.by_score.other),
            ] {
                println!("  {:<18} {}", category.label(), count);
            }
            println!("Upcoming interviews: {}", stats.upcoming_interviews);
            println!("Applied this week:   {}", stats.applied_this_week);
            println!("Response rate:       {}%", stats.response_rate);
            if !stats.by_status.is_empty() {
                println!("By status:");
                let mut entries: Vec<_> = stats.by_status.iter().collect();
                entries.sort();
                for (status, count) in entries {
                    println!("  {:<14} {}", status, count);
                }
            }
        }
    }

    Ok(())
}
