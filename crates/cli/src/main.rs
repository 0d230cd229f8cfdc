use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use guide_core::{GuideError, ItineraryRequest};
use guide_observability::{init_tracing, AppMetrics};
use guide_service::{GuideSettings, ItineraryService};

#[derive(Debug, Parser)]
#[command(name = "guide")]
#[command(about = "Sightseeing itinerary planner")]
struct Cli {
    /// Prepared dataset: a JSON file or a directory of JSON shards.
    #[arg(long, env = "GUIDE_DATASET")]
    dataset: Option<PathBuf>,

    #[arg(long, env = "GUIDE_TAG_RULES")]
    tag_rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Plan {
        #[arg(long = "interest", required = true, value_delimiter = ',')]
        interests: Vec<String>,
        #[arg(long)]
        hours: f64,
        #[arg(long, default_value = "")]
        location: String,
    },
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    Stats,
    Search {
        #[arg(required = true, value_delimiter = ',')]
        interests: Vec<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing("guide_cli");
    let cli = Cli::parse();

    let mut settings = GuideSettings::from_env()?;
    if let Some(dataset) = cli.dataset {
        settings.dataset = dataset;
    }
    if cli.tag_rules.is_some() {
        settings.tag_rules = cli.tag_rules;
    }

    let service = ItineraryService::from_settings(&settings, AppMetrics::shared())?;
    let stats = service.warm_up().await?;

    match cli.command {
        Command::Plan {
            interests,
            hours,
            location,
        } => {
            let request = ItineraryRequest::new(interests, hours, location);
            match service
                .plan_with_timeout(request, settings.plan_timeout)
                .await
            {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(err) if is_client_error(&err) => {
                    eprintln!("{err}");
                    return Ok(ExitCode::from(2));
                }
                Err(err) => return Err(err),
            }
        }
        Command::Catalog { command } => match command {
            CatalogCommand::Stats => println!("{}", serde_json::to_string_pretty(&stats)?),
            CatalogCommand::Search { interests, limit } => {
                let matches = service.search(&interests, limit)?;
                println!("{}", serde_json::to_string_pretty(&matches)?);
            }
        },
    }

    tracing::debug!(metrics = ?service.metrics(), "cli finished");
    Ok(ExitCode::SUCCESS)
}

fn is_client_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<GuideError>()
        .is_some_and(GuideError::is_client_error)
}
