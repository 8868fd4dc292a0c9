//! Marketeer - autonomous marketing agents for small businesses

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{delegate_command, demo_command, init_command, status_command};

/// Marketeer - a marketing team in your terminal
#[derive(Parser)]
#[command(name = "marketeer")]
#[command(about = "◆ Autonomous marketing agents for small businesses")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config and a sample business profile
    Init,
    /// Hand a goal to the marketing manager
    Delegate {
        /// Goal to delegate; omit for interactive mode
        #[arg(short, long)]
        goal: Option<String>,
        /// Business profile file
        #[arg(short, long)]
        profile: Option<PathBuf>,
        /// Print each specialist's conversation
        #[arg(long)]
        trace: bool,
    },
    /// Run the two sample goals
    Demo {
        /// Business profile file
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },
    /// Show configuration status
    Status,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init => init_command().await,
        Commands::Delegate {
            goal,
            profile,
            trace,
        } => delegate_command(goal, profile, trace).await,
        Commands::Demo { profile } => demo_command(profile).await,
        Commands::Status => status_command().await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
