//! flightboard - Taiwanese airport flight boards in the terminal
//!
//! Queries the TDX open-data air API for live arrivals, departures,
//! periodic schedules and seat availability.

mod api;
mod auth;
mod config;
mod error;
mod models;
mod tui;
mod watch;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::Board;
use crate::config::Config;
use crate::models::{AirportCode, Locale};

#[derive(Parser)]
#[command(name = "flightboard")]
#[command(about = "Flight boards for Taiwanese airports from TDX open data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Language for weekdays and flight status
    #[arg(long, global = true)]
    lang: Option<Locale>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show arriving flights at an airport
    Arrivals {
        /// Airport code, e.g. TPE
        airport: String,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show departing flights at an airport
    Departures {
        /// Airport code, e.g. TPE
        airport: String,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the periodic international schedule of an airport
    Schedule {
        /// Airport code, e.g. TPE
        airport: String,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one carrier's flights at an airport
    Airline {
        /// Airport code, e.g. TPE
        airport: String,

        /// Carrier code, e.g. CI
        airline: String,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show seat availability for a flight
    Seats {
        /// Flight number, e.g. B7123
        flight: String,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reprint a board on the auto-refresh interval until Ctrl+C
    Watch {
        /// Airport code, e.g. TPE
        airport: String,

        /// Board to show
        #[arg(short, long, value_enum, default_value = "arrivals")]
        board: Board,
    },

    /// Exchange credentials for an access token and show its lifetime
    Token,

    /// List the built-in airports
    Airports,

    /// Write a config file with TDX client credentials
    Init {
        #[arg(long)]
        client_id: String,

        #[arg(long)]
        client_secret: String,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Launch the interactive dashboard
    Tui {
        /// Airport to show on start
        #[arg(short, long)]
        airport: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The dashboard owns the terminal, so its log lines
    // go to the in-app log pane instead of stderr.
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    let logs = tui::LogBuffer::new();
    if matches!(cli.command, Commands::Tui { .. }) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(logs.clone()),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    let command = match cli.command {
        Commands::Init {
            client_id,
            client_secret,
            force,
        } => {
            let path = Config::init(cli.config.as_deref(), &client_id, &client_secret, force)?;
            println!("Wrote {}", path.display());
            return Ok(());
        }
        command => command,
    };

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(lang) = cli.lang {
        config.display.locale = lang;
    }

    match command {
        Commands::Arrivals { airport, json } => {
            api::print_board(&config, Board::Arrivals, &airport, json).await?;
        }
        Commands::Departures { airport, json } => {
            api::print_board(&config, Board::Departures, &airport, json).await?;
        }
        Commands::Schedule { airport, json } => {
            api::print_board(&config, Board::Schedule, &airport, json).await?;
        }
        Commands::Airline {
            airport,
            airline,
            json,
        } => {
            api::print_airline(&config, &airport, &airline, json).await?;
        }
        Commands::Seats { flight, json } => {
            api::print_seats(&config, &flight, json).await?;
        }
        Commands::Watch { airport, board } => {
            watch::run(&config, &airport, board).await?;
        }
        Commands::Token => {
            api::print_token(&config).await?;
        }
        Commands::Airports => {
            api::print_airports(config.display.locale);
        }
        // Handled before the config is loaded.
        Commands::Init { .. } => {}
        Commands::Tui { airport } => {
            let airport = airport.as_deref().map(AirportCode::new).transpose()?;
            tui::run(config, airport, logs).await?;
        }
    }

    Ok(())
}
