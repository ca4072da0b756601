use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod backend;
pub mod chat;
pub mod init;
pub mod job;
pub mod migrate;
pub mod seed;
pub mod serve;
pub mod stats;

use crate::core::AppConfig;
use job::JobId;

#[derive(Subcommand)]
enum Command {
    /// Create the ledger database
    Init {},
    /// Migrate the db schema
    Migrate {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Print aggregate carbon statistics
    Stats {
        /// Only count this conversation
        #[arg(long)]
        chat_id: Option<String>,
        #[arg(long, action, default_value = "false")]
        json: bool,
    },
    /// Print the cache hit timeline of a conversation
    Timeline {
        #[arg(long)]
        chat_id: String,
    },
    /// List conversations
    Chats {},
    /// Load demo conversations into an empty ledger
    Seed {},
    /// Delete every message and conversation
    Clear {},
    /// Start a chat session
    Chat {
        /// Continue an existing conversation
        #[arg(long)]
        chat_id: Option<String>,
    },
    /// Check the orchestrator backend is up
    Health {},
    /// Print grid carbon intensity by region
    Grid {},
    /// Ask for a short spoken-style answer
    Voice {
        #[arg(long)]
        text: String,
    },
    /// Run a periodic job once
    Job {
        #[arg(long, value_enum)]
        id: JobId,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Log to stderr for one-off commands. The server sets up its own
/// subscriber.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    if !matches!(args.command, Some(Command::Serve { .. }) | None) {
        init_tracing();
    }

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&config).await?;
        }
        Some(Command::Migrate {}) => {
            migrate::run(&config).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Stats { chat_id, json }) => {
            stats::run(&config, chat_id, json).await?;
        }
        Some(Command::Timeline { chat_id }) => {
            stats::timeline(&config, &chat_id).await?;
        }
        Some(Command::Chats {}) => {
            stats::chats(&config).await?;
        }
        Some(Command::Seed {}) => {
            seed::run(&config).await?;
        }
        Some(Command::Clear {}) => {
            seed::clear(&config).await?;
        }
        Some(Command::Chat { chat_id }) => {
            chat::run(&config, chat_id).await?;
        }
        Some(Command::Health {}) => {
            backend::health(&config).await?;
        }
        Some(Command::Grid {}) => {
            backend::grid(&config).await?;
        }
        Some(Command::Voice { text }) => {
            backend::voice(&config, text).await?;
        }
        Some(Command::Job { id }) => {
            job::run(&config, id).await?;
        }
        None => {}
    }

    Ok(())
}
