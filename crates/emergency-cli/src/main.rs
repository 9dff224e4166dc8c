//! Emergency Assist
//!
//! Interactive console for reporting an emergency: registers the user's
//! profile, guides them through describing the incident, simulates the alert
//! to the emergency line and records everything under the logs directory.

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use colored::*;
use emergency_core::dispatch::{InterruptState, InterruptiblePause};
use emergency_core::{ChannelKind, Config, Console, EmergencyError, Session};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "emergency-assist")]
#[command(version)]
#[command(about = "Guided emergency reporting with simulated dispatch")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON config file (missing keys keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for incident history, feedback and audit logs
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,

    /// Alert channel: standard or call
    #[arg(long, global = true)]
    channel: Option<ChannelKind>,

    /// Emergency number shown when connecting
    #[arg(long, global = true)]
    emergency_number: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive reporting session (default)
    Run,

    /// List recorded emergencies and their feedback
    History {
        /// Only show the most recent N incidents
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List regional health centers
    Centers {
        /// Filter by municipality
        #[arg(short, long)]
        municipality: Option<String>,
    },

    /// Show the response protocol for an emergency type (1-5)
    Protocol {
        /// Menu number of the emergency type
        choice: u8,
    },
}

fn load_config(cli: &Cli) -> Result<Config, EmergencyError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &cli.logs_dir {
        config.logs_dir = dir.clone();
    }
    if let Some(channel) = cli.channel {
        config.channel = channel;
    }
    if let Some(number) = &cli.emergency_number {
        config.emergency_number = number.clone();
    }
    config.validate()?;
    Ok(config)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    process::exit(1);
}

fn run_session(config: Config) -> Result<(), EmergencyError> {
    let interrupts = Arc::new(InterruptState::new());
    {
        let interrupts = interrupts.clone();
        // Ctrl-C while connecting fails the dispatch; anywhere else it quits
        ctrlc::set_handler(move || {
            if !interrupts.interrupt() {
                eprintln!("\nInterrupted.");
                process::exit(130);
            }
        })
        .map_err(|e| EmergencyError::Config(format!("cannot install Ctrl-C handler: {}", e)))?;
    }

    let session = Session::new(config, Arc::new(InterruptiblePause::new(interrupts)));
    let mut console = Console::stdio();
    session.run(&mut console)
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = load_config(&cli).unwrap_or_else(|e| fail(e));
    tracing::debug!(?config, "configuration loaded");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            println!("{}", "═".repeat(60).cyan());
            println!("{}", "  EMERGENCY ASSIST".cyan().bold());
            println!("{}", format!("  Emergency line: {}", config.emergency_number).cyan());
            println!("{}", "═".repeat(60).cyan());

            if let Err(e) = run_session(config) {
                fail(e);
            }
        }
        Commands::History { limit } => {
            if let Err(e) = commands::history(&config.logs_dir, limit) {
                fail(e);
            }
        }
        Commands::Centers { municipality } => {
            commands::centers(municipality.as_deref());
        }
        Commands::Protocol { choice } => {
            if let Err(e) = commands::protocol(choice) {
                fail(e);
            }
        }
    }
}
