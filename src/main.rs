mod api;
mod cli;
mod config;
mod error;
mod models;
mod roster;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::services::Session;

#[derive(Parser)]
#[command(name = "seasonforge")]
#[command(about = "A single-season football club management simulator")]
struct Cli {
    /// Roster CSV for the human club (overrides ROSTER_PATH)
    #[arg(long, global = true)]
    roster: Option<PathBuf>,

    /// Season seed (overrides SEASON_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Simulate rounds and print the results
    Play {
        /// Number of rounds; the whole season when omitted
        #[arg(short, long)]
        rounds: Option<u32>,
    },
    /// Show a club's squad and fixtures
    Team {
        #[arg(short, long)]
        name: String,
    },
    /// Roll a scout list, optionally signing one candidate
    Scout {
        /// 1-based position in the list
        #[arg(short, long)]
        sign: Option<usize>,
    },
    /// Simulate a full season and export the final standings
    Export {
        #[arg(short, long, default_value = "csv")]
        format: String,
        #[arg(short, long, default_value = "data/exports/standings.csv")]
        path: PathBuf,
    },
}

fn load_session(cli: &Cli) -> Result<Session> {
    let mut config = EngineConfig::from_env()?;
    if let Some(roster) = &cli.roster {
        config.roster_path = roster.clone();
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    tracing::info!("Loading roster from {}", config.roster_path.display());
    Ok(Session::from_roster_file(config)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before RUST_LOG is read
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut session = load_session(&cli)?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting SeasonForge API server on port {}", port);
            api::serve(port, session).await?;
        }
        Some(Commands::Play { rounds }) => {
            cli::play_season(&mut session, rounds)?;
        }
        Some(Commands::Team { name }) => {
            tracing::info!("Querying team: {}", name);
            cli::query_team(&session, &name)?;
        }
        Some(Commands::Scout { sign }) => {
            cli::scout(&mut session, sign)?;
        }
        Some(Commands::Export { format, path }) => {
            cli::export_standings(&mut session, &format, &path)?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting SeasonForge API server on port 3000");
            api::serve(3000, session).await?;
        }
    }

    Ok(())
}
