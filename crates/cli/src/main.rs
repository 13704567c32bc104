//! Journal CLI
//!
//! Keeps a journal draft in sync with a local file and uploads attachments to
//! the journal server.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

/// Journal CLI: autosave drafts and upload attachments.
#[derive(Parser, Debug)]
#[command(name = "journal", version, about)]
struct Cli {
    /// URL of the journal editing page, including its query parameters.
    #[arg(long, env = "JOURNAL_PAGE_URL", global = true)]
    page_url: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(long, env = "JOURNAL_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Autosave a draft from a file until interrupted.
    Draft(commands::draft::DraftArgs),
    /// Upload files as attachments.
    Attach(commands::attach::AttachArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref(), cli.page_url)?;
    let client = Arc::new(config::client(&config)?);

    match cli.command {
        Command::Draft(args) => commands::draft::run(client, &config, &args).await,
        Command::Attach(args) => commands::attach::run(client, &config, &args).await,
    }
}
