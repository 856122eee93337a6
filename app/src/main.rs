#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;
mod terminal;

use command::{
    ChatStrategy, CommandStrategy, GlobalArgs, InfoStrategy, InitStrategy, SendInput,
    SendStrategy, SessionInput, SessionStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "webchat")]
#[command(about = "Chat widget client for webhook-backed assistants", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/webchat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Webhook URL, overriding widget.destination_url
    #[arg(long, global = true)]
    destination: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively
    Chat,
    /// Send a single message and print the reply
    Send {
        /// Message to send
        #[arg(short = 'm', long)]
        message: String,

        /// Print the raw webhook response and every failed attempt
        #[arg(long)]
        debug: bool,
    },
    /// Show the stored session
    Session {
        /// Remove the stored session
        #[arg(long)]
        reset: bool,
    },
    /// Show effective configuration
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let global = GlobalArgs {
        config: cli.config,
        destination: cli.destination,
    };

    match cli.command {
        Commands::Chat => ChatStrategy.execute(global).await,
        Commands::Send { message, debug } => {
            SendStrategy
                .execute(SendInput {
                    global,
                    message,
                    debug,
                })
                .await
        }
        Commands::Session { reset } => {
            SessionStrategy
                .execute(SessionInput { global, reset })
                .await
        }
        Commands::Info => InfoStrategy.execute(global).await,
        Commands::Init => InitStrategy.execute(global).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
