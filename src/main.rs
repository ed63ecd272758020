use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rivals_stats::batch::BatchOrchestrator;
use rivals_stats::client::StatsClient;
use rivals_stats::config::{AppConfig, MAX_CONCURRENCY};
use rivals_stats::models::{BatchResult, HeroCatalog, Report};
use rivals_stats::pipeline::LookupPipeline;
use rivals_stats::present;
use rivals_stats::roster::{RosterExtractor, TesseractDetector};
use rivals_stats::{parse_duration, StatsError};

#[derive(Parser)]
#[command(name = "rivals-stats")]
#[command(about = "Marvel Rivals competitive stats lookup")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Per-request timeout (e.g., "10s", "500ms")
    #[arg(long)]
    timeout: Option<String>,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a player
    Stats {
        /// Player name; multiple words are joined with spaces
        #[arg(required = true)]
        name: Vec<String>,
    },

    /// Rebuild a player's report from fresh data
    Refresh {
        /// Username of the report to rebuild
        name: String,
    },

    /// Look up every player on a leaderboard screenshot
    Roster {
        /// Screenshot path
        image: PathBuf,

        /// Concurrent lookups; defaults to the config file
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print the names read from a leaderboard screenshot
    Names {
        /// Screenshot path
        image: PathBuf,
    },
}

/// JSON shape for a single lookup.
#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LookupOutput<'a> {
    Ok {
        report: &'a Report,
    },
    Failed {
        name: &'a str,
        kind: rivals_stats::FailureKind,
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(Path::new(&cli.config))
        .with_context(|| format!("loading config from {}", cli.config))?;

    // Initialize tracing
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting rivals-stats v{}", env!("CARGO_PKG_VERSION"));

    let mut client_config = config.api.client_config()?;
    if let Some(raw) = cli.timeout.as_deref() {
        client_config.timeout = parse_duration(raw)
            .filter(|d| !d.is_zero())
            .with_context(|| format!("invalid --timeout: {}", raw))?;
    }

    let catalog = Arc::new(HeroCatalog::new(&config.api.icon_base_url));
    let client = StatsClient::new(client_config)?;
    let pipeline = LookupPipeline::new(Arc::new(client), catalog.clone());

    match cli.command {
        Commands::Stats { name } => {
            let name = name.join(" ");
            let outcome = pipeline.lookup(&name).await;
            print_lookup(&name, &outcome, &config, &catalog, cli.json)?;
            lookup_status("lookup", &name, outcome)?;
        }

        Commands::Refresh { name } => {
            let outcome = pipeline.refresh(&name).await;
            print_lookup(&name, &outcome, &config, &catalog, cli.json)?;
            lookup_status("refresh", &name, outcome)?;
        }

        Commands::Names { image } => {
            let names = match extract_names(&image, &config).await? {
                Ok(names) => names,
                Err(e) => {
                    eprintln!("{}", present::failure_message("", &e, &config.api));
                    return Err(e)
                        .with_context(|| format!("reading names from {}", image.display()));
                }
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in &names {
                    println!("{}", name);
                }
            }
        }

        Commands::Roster { image, concurrency } => {
            let concurrency = concurrency.unwrap_or(config.batch.concurrency);
            if concurrency == 0 || concurrency > MAX_CONCURRENCY {
                anyhow::bail!("--concurrency must be between 1 and {}", MAX_CONCURRENCY);
            }

            let names = match extract_names(&image, &config).await? {
                Ok(names) => names,
                Err(e) => {
                    eprintln!("{}", present::failure_message("", &e, &config.api));
                    return Err(e)
                        .with_context(|| format!("reading names from {}", image.display()));
                }
            };

            let orchestrator = Arc::new(BatchOrchestrator::new(pipeline, concurrency));

            let interrupt = {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::warn!("Interrupt received, cancelling roster lookup");
                        orchestrator.cancel().await;
                    }
                })
            };

            let result = orchestrator.process_roster(names).await;
            interrupt.abort();
            let result = ensure_complete(result)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", present::render_batch(&result, &catalog));
            }
        }
    }

    Ok(())
}

/// Read a screenshot and run text detection off the async runtime.
///
/// The outer error is for I/O and task failures; the inner one is a
/// user-facing extraction failure.
async fn extract_names(
    image: &Path,
    config: &AppConfig,
) -> Result<std::result::Result<Vec<String>, StatsError>> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("reading {}", image.display()))?;

    let extractor = RosterExtractor::new(Box::new(TesseractDetector::from_config(&config.ocr)));
    let outcome = tokio::task::spawn_blocking(move || extractor.extract_names(&bytes)).await?;

    Ok(outcome.map(|names| {
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names
    }))
}

/// Turn a printed lookup outcome into the process status.
fn lookup_status(
    action: &str,
    name: &str,
    outcome: std::result::Result<Report, StatsError>,
) -> Result<()> {
    outcome
        .map(|_| ())
        .with_context(|| format!("{} for {} failed", action, name))
}

/// Partial results from a cancelled batch are dropped.
fn ensure_complete(result: BatchResult) -> Result<BatchResult> {
    if result.cancelled {
        anyhow::bail!(
            "Roster lookup cancelled; discarding {} partial results",
            result.total()
        );
    }
    Ok(result)
}

fn print_lookup(
    name: &str,
    outcome: &std::result::Result<Report, StatsError>,
    config: &AppConfig,
    catalog: &HeroCatalog,
    json: bool,
) -> Result<()> {
    if json {
        let output = match outcome {
            Ok(report) => LookupOutput::Ok { report },
            Err(e) => LookupOutput::Failed {
                name,
                kind: e.kind(),
                message: present::failure_message(name, e, &config.api),
            },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match outcome {
        Ok(report) => println!("{}", present::render_report(report, catalog)),
        Err(e) => {
            tracing::debug!("Lookup for {} failed: {}", name, e);
            println!("{}", present::failure_message(name, e, &config.api));
        }
    }
    Ok(())
}
