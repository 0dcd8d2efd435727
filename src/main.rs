use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod alerts;
mod config;
mod db;
mod error;
mod factors;
mod models;
mod mood;
mod report;
mod risk;
mod scoring;
mod team;

use crate::alerts::WellnessAlert;
use crate::config::ScoringConfig;
use crate::models::{BurnoutAssessment, EmployeeSignalSnapshot, TeamMember};
use crate::mood::MoodPatterns;

#[derive(Parser)]
#[command(name = "mood-burnout")]
#[command(about = "Burnout risk scoring and team wellness reporting", long_about = None)]
struct Cli {
    /// JSON file overriding the default scoring configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Append a mood sample for an employee
    Record {
        #[arg(long)]
        employee: String,
        #[arg(long)]
        mood: String,
        #[arg(long)]
        score: Option<f64>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Score a signal snapshot read from a JSON file
    Score {
        #[arg(long)]
        input: PathBuf,
        /// Fill a missing mood history from the store and emit alerts
        #[arg(long)]
        employee: Option<String>,
        /// Persist the assessment for the employee
        #[arg(long, requires = "employee")]
        save: bool,
    },
    /// Aggregate team health from a JSON member list or the store
    Team {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, conflicts_with = "input")]
        department: Option<String>,
    },
    /// Summarize an employee's mood history
    History {
        #[arg(long)]
        employee: String,
        #[arg(long, default_value_t = 30)]
        limit: i64,
    },
    /// Generate a markdown team report
    Report {
        #[arg(long)]
        department: Option<String>,
        #[arg(long, default_value_t = 7)]
        since_days: i64,
        #[arg(long, default_value = "team-report.md")]
        out: PathBuf,
    },
}

#[derive(Serialize)]
struct ScoreReport {
    #[serde(flatten)]
    assessment: BurnoutAssessment,
    degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    degraded_reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    alerts: Vec<WellnessAlert>,
}

#[derive(Serialize)]
struct HistorySummary {
    employee: String,
    entries: usize,
    mood_trend: f64,
    engagement: f64,
    stress_level: f64,
    patterns: Option<MoodPatterns>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    alerts: Vec<WellnessAlert>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Record {
            employee,
            mood,
            score,
            department,
        } => {
            let pool = connect().await?;
            db::record_mood(&pool, &employee, department.as_deref(), &mood, score).await?;
            println!("Recorded {mood} for {employee}.");
        }
        Commands::Score {
            input,
            employee,
            save,
        } => {
            let mut payload = read_json(&input)?;
            let history_missing = mood_history_missing(&payload);
            let pool = if needs_store(employee.as_deref(), history_missing, save) {
                Some(connect().await?)
            } else {
                None
            };

            let mut history_from_input = true;
            if let (Some(name), Some(pool)) = (&employee, &pool) {
                if history_missing {
                    let limit = config.trend_window as i64;
                    let history = db::fetch_history(pool, name, limit).await?;
                    let labels: Vec<String> = history.into_iter().map(|e| e.mood).collect();
                    if let Some(object) = payload.as_object_mut() {
                        tracing::info!("Loaded {} stored mood samples for {}", labels.len(), name);
                        object.insert("mood_history".to_string(), serde_json::json!(labels));
                        history_from_input = false;
                    }
                }
            }

            let recent_moods = serde_json::from_value::<EmployeeSignalSnapshot>(payload.clone())
                .map(|snapshot| snapshot.mood_labels())
                .unwrap_or_default();
            let latest_mood = recent_moods.last().cloned();
            let outcome = scoring::score_value(payload, &config);
            let assessment = outcome.assessment().clone();

            let score_alerts = match &employee {
                Some(name) => {
                    let mut found = alerts::generate_alerts(
                        name,
                        latest_mood.as_deref(),
                        assessment.score,
                        &config,
                    );
                    found.extend(alerts::mood_decline_alert(name, &recent_moods, &config));
                    alerts::prioritize(found)
                }
                None => Vec::new(),
            };

            if let (Some(name), Some(pool)) = (&employee, &pool) {
                if save {
                    let employee_id = db::upsert_employee(pool, name, None).await?;
                    let degraded = outcome.is_degraded();
                    db::save_assessment(pool, employee_id, &assessment, degraded).await?;
                    if let Some(mood) = latest_mood.as_deref().filter(|_| history_from_input) {
                        db::record_mood(pool, name, None, mood, Some(assessment.score)).await?;
                    }
                    tracing::info!("Saved assessment for {}", name);
                }
            }

            let output = ScoreReport {
                assessment,
                degraded: outcome.is_degraded(),
                degraded_reason: outcome.reason().map(|e| e.to_string()),
                alerts: score_alerts,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Team { input, department } => {
            let members: Vec<TeamMember> = match input {
                Some(path) => serde_json::from_value(read_json(&path)?)
                    .with_context(|| format!("{} is not a list of team members", path.display()))?,
                None => {
                    let pool = connect().await?;
                    db::fetch_team_members(&pool, department.as_deref()).await?
                }
            };
            let aggregate = team::aggregate(&members, &config);
            println!("{}", serde_json::to_string_pretty(&aggregate)?);
        }
        Commands::History { employee, limit } => {
            let pool = connect().await?;
            let history = db::fetch_history(&pool, &employee, limit.max(1)).await?;
            let labels: Vec<String> = history.iter().map(|e| e.mood.clone()).collect();
            let decline = alerts::mood_decline_alert(&employee, &labels, &config);

            let summary = HistorySummary {
                employee,
                entries: history.len(),
                mood_trend: mood::mood_trend(&labels, &config.lexicon, config.trend_window),
                engagement: factors::engagement(&history, &config.moods),
                stress_level: factors::stress_level(&labels, &config.moods),
                patterns: mood::analyze_patterns(&labels, &config.lexicon),
                alerts: decline.into_iter().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Report {
            department,
            since_days,
            out,
        } => {
            let pool = connect().await?;
            let since_date =
                chrono::Utc::now().date_naive() - chrono::Duration::days(since_days.max(1));
            let members = db::fetch_team_members(&pool, department.as_deref()).await?;
            let trends = db::fetch_daily_trends(&pool, since_date, department.as_deref()).await?;
            let aggregate = team::aggregate(&members, &config);

            let team_label = department.as_deref().unwrap_or("all departments");
            let mut team_alerts: Vec<WellnessAlert> =
                alerts::team_health_alert(team_label, &members, &config).into_iter().collect();
            for member in members.iter() {
                let name = member.name.as_deref().unwrap_or("unnamed");
                team_alerts.extend(alerts::generate_alerts(
                    name,
                    member.mood.as_deref(),
                    member.score,
                    &config,
                ));
            }
            let team_alerts = alerts::prioritize(team_alerts);

            let report = report::build_report(
                department.as_deref(),
                since_date,
                &aggregate,
                &members,
                &trends,
                &team_alerts,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ScoringConfig> {
    match path {
        Some(path) => {
            let config = ScoringConfig::load(path)
                .with_context(|| format!("failed to load scoring config from {}", path.display()))?;
            tracing::info!(
                "Using scoring config from {} ({} formula)",
                path.display(),
                config.formula.as_str()
            );
            Ok(config)
        }
        None => Ok(ScoringConfig::default()),
    }
}

fn mood_history_missing(payload: &serde_json::Value) -> bool {
    payload.get("mood_history").map_or(true, |history| history.is_null())
}

/// The store is needed only to fill a missing history or to save.
fn needs_store(employee: Option<&str>, history_missing: bool, save: bool) -> bool {
    employee.is_some() && (history_missing || save)
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    tracing::debug!("Database connection established");

    Ok(pool)
}
