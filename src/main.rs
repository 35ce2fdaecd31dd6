use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod risk;

use models::{AnalysisDetail, RiskAnalysis, RiskLevel};

#[derive(Parser)]
#[command(name = "risk-signals")]
#[command(about = "Emotional-diary risk signal evaluator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import diary entries from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Analyze a user's recent diary and classify their risk level
    Analyze {
        #[arg(long)]
        email: String,
        /// Emit the analysis envelope as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the current detection thresholds
    ShowSettings,
    /// Update detection thresholds (unset values keep their current value)
    SetSettings {
        #[arg(long)]
        monitoring_period: Option<i64>,
        #[arg(long)]
        high_consecutive: Option<i32>,
        #[arg(long)]
        high_period: Option<i32>,
        #[arg(long)]
        medium_consecutive: Option<i32>,
        #[arg(long)]
        medium_period: Option<i32>,
        #[arg(long)]
        low_consecutive: Option<i32>,
        #[arg(long)]
        low_period: Option<i32>,
    },
    /// Generate a markdown analysis report for a user
    Report {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Clear the alert-shown flag for a user (logout)
    ResetSession {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} diary entries from {}.", csv.display());
        }
        Commands::Analyze { email, json } => {
            let settings = db::load_settings(&pool).await?;
            let user_id = db::user_id_by_email(&pool, &email).await?;
            let since_date = risk::cutoff_date(settings.monitoring_period);
            let entries = db::fetch_recent_entries(&pool, user_id, since_date).await?;
            let result = risk::calculate_risk_signals(&entries, &settings);
            let phones = db::urgent_counseling_phones(&pool, result.risk_level).await?;

            let analysis = RiskAnalysis {
                risk_level: result.risk_level,
                reasons: result.reasons.clone(),
                analysis: AnalysisDetail {
                    monitoring_period: settings.monitoring_period,
                    consecutive_score: result.consecutive_score,
                    score_in_period: result.score_in_period,
                },
                urgent_counseling_phones: phones,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }

            println!(
                "Risk level for {email}: {} (consecutive {}, period {} over {} days)",
                analysis.risk_level.as_str(),
                analysis.analysis.consecutive_score,
                analysis.analysis.score_in_period,
                analysis.analysis.monitoring_period
            );

            for reason in analysis.reasons.iter() {
                println!("- {reason}");
            }

            if analysis.risk_level == RiskLevel::None {
                return Ok(());
            }

            if db::alert_already_shown(&pool, user_id).await? {
                println!("Alert suppressed: already shown this session.");
                return Ok(());
            }

            println!();
            println!("{}", report::notification_message(analysis.risk_level));

            if !analysis.urgent_counseling_phones.is_empty() {
                println!(
                    "Urgent counseling: {}",
                    analysis.urgent_counseling_phones.join(", ")
                );
            }

            db::mark_alert_shown(&pool, user_id).await?;
        }
        Commands::ShowSettings => {
            let settings = db::load_settings(&pool).await?;
            println!("Monitoring period: {} days", settings.monitoring_period);
            for (name, level) in [
                ("high", settings.high),
                ("medium", settings.medium),
                ("low", settings.low),
            ] {
                println!(
                    "{name}: consecutive >= {} or period >= {}",
                    level.consecutive_score, level.score_in_period
                );
            }
        }
        Commands::SetSettings {
            monitoring_period,
            high_consecutive,
            high_period,
            medium_consecutive,
            medium_period,
            low_consecutive,
            low_period,
        } => {
            let mut settings = db::load_settings(&pool).await?;

            if let Some(value) = monitoring_period {
                settings.monitoring_period = value;
            }
            if let Some(value) = high_consecutive {
                settings.high.consecutive_score = value;
            }
            if let Some(value) = high_period {
                settings.high.score_in_period = value;
            }
            if let Some(value) = medium_consecutive {
                settings.medium.consecutive_score = value;
            }
            if let Some(value) = medium_period {
                settings.medium.score_in_period = value;
            }
            if let Some(value) = low_consecutive {
                settings.low.consecutive_score = value;
            }
            if let Some(value) = low_period {
                settings.low.score_in_period = value;
            }

            settings.validate()?;
            db::save_settings(&pool, &settings).await?;
            println!("Settings updated.");
        }
        Commands::Report { email, out } => {
            let settings = db::load_settings(&pool).await?;
            let user_id = db::user_id_by_email(&pool, &email).await?;
            let since_date = risk::cutoff_date(settings.monitoring_period);
            let entries = db::fetch_recent_entries(&pool, user_id, since_date).await?;
            let result = risk::calculate_risk_signals(&entries, &settings);
            let report = report::build_report(
                &email,
                settings.monitoring_period,
                since_date,
                &entries,
                &result,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::ResetSession { email } => {
            let user_id = db::user_id_by_email(&pool, &email).await?;
            db::reset_session(&pool, user_id).await?;
            println!("Session cleared for {email}.");
        }
    }

    Ok(())
}
