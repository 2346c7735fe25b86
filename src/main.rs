use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod chat;
mod config;
mod error;
mod gemini;
mod messages;
mod models;
mod report;
mod scoring;
mod source;

use crate::chat::{PanicContext, VentSession};
use crate::config::GeminiConfig;
use crate::error::PanicError;
use crate::gemini::GeminiClient;
use crate::models::Assignment;

#[derive(Parser)]
#[command(name = "monkey-ranger")]
#[command(about = "Assignment panic dashboard with a very dramatic monkey", long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .args(["csv", "json"])
        .multiple(false)
))]
struct Cli {
    /// Load assignments from a CSV file instead of the sample set
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    /// Load assignments from a JSON array instead of the sample set
    #[arg(long, global = true)]
    json: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the panic score and the most urgent assignments
    Score {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print annotated assignments as JSON
        #[arg(long)]
        json_output: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Vent to the monkey
    Vent {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Rate the most urgent assignment that is not yet overdue
    Difficulty,
    /// Print one fallback line for a threat level key
    Roast {
        #[arg(long)]
        level: String,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("MONKEY_RANGER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_assignments(cli: &Cli) -> anyhow::Result<Vec<Assignment>> {
    let loaded = match (&cli.csv, &cli.json) {
        (Some(path), _) => source::import_csv(path)?,
        (_, Some(path)) => source::import_json(path)?,
        (None, None) => return Ok(source::fixture(Utc::now())),
    };

    Ok(loaded.assignments)
}

fn build_session() -> anyhow::Result<VentSession<GeminiClient>> {
    let config = GeminiConfig::from_env()?;
    let client = match GeminiClient::from_config(&config) {
        Ok(client) => Some(client),
        Err(PanicError::NoCredential) => None,
        Err(err) => return Err(err).context("failed to build the Gemini client"),
    };
    Ok(VentSession::new(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let assignments = load_assignments(&cli)?;
    let now = Utc::now();
    let mut rng = rand::thread_rng();

    match cli.command {
        Commands::Score { limit, json_output } => {
            let panic_score = scoring::aggregate_panic_score(&assignments, now);
            let mut annotated = scoring::process_assignments(&assignments, now, &mut rng);
            scoring::sort_by_urgency(&mut annotated);

            if json_output {
                let listed: Vec<_> = annotated.iter().take(limit).collect();
                let payload = serde_json::json!({
                    "panicScore": panic_score,
                    "assignments": listed,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            println!("Panic score: {panic_score}%");
            match scoring::most_urgent(&assignments, now) {
                Some(urgent) => {
                    let level = scoring::classify(urgent, now);
                    println!("{}", messages::pick_fallback_message(level, &mut rng));
                }
                None => println!("{}", messages::NO_UNSUBMITTED_MESSAGE),
            }

            if annotated.is_empty() {
                println!("No assignments loaded.");
                return Ok(());
            }

            println!();
            for a in annotated.iter().take(limit) {
                println!(
                    "{} {} ({}) {} [{}]",
                    a.threat.emoji(),
                    a.assignment.name,
                    a.assignment.course,
                    a.time_left,
                    a.threat.label()
                );
            }
        }
        Commands::Report { out } => {
            let report = report::build_report(&assignments, now, &mut rng);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Vent { message } => {
            let session = build_session()?;
            let context = PanicContext::from_assignments(&assignments, now);
            let reply = session
                .vent(&context, &message.join(" "), &mut rng)
                .await?;

            if let Some(notice) = reply.notice.as_deref() {
                eprintln!("{notice}");
            }
            println!("🐒 {}", reply.text);
        }
        Commands::Difficulty => {
            let session = build_session()?;
            match session.rate_difficulty(&assignments, now, &mut rng).await? {
                Some(rating) => {
                    println!(
                        "{}: {}/10 {} [{}]",
                        rating.assignment_name,
                        rating.score,
                        rating.label,
                        rating.tier.key()
                    );
                    println!("{}", rating.roast);
                }
                None => println!("Nothing upcoming to rate. Monkey is almost proud."),
            }
        }
        Commands::Roast { level } => {
            println!("{}", messages::fallback_message_for_key(&level, &mut rng));
        }
    }

    Ok(())
}
