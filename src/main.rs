// src/main.rs — ticketpilot entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use ticketpilot::cli::{self, tickets, Cli, Commands};
use ticketpilot::core::desk::SupportDesk;
use ticketpilot::infra::config::Config;
use ticketpilot::infra::logger;
use ticketpilot::store::{self, Repository};

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = if let Some(ref path) = cli.config {
        Config::load_from(Path::new(path))?
    } else {
        Config::load()?
    };
    if let Some(ref db) = cli.db {
        config.store.path = Some(PathBuf::from(db));
    }

    let db_path = config.store.db_path();
    let repo: Arc<dyn Repository> = Arc::new(store::open(&db_path)?);
    tracing::debug!(path = %db_path.display(), "Database opened");

    // Seeding needs neither a generator nor a trained classifier
    if let Commands::Seed = cli.command {
        return tickets::seed(repo.as_ref());
    }

    let desk = SupportDesk::start(&config, repo).await;

    match cli.command {
        Commands::Chat { session } => {
            let session_id = config.chat.session_id(session);
            cli::chat::run_chat(&desk, &session_id).await
        }
        Commands::Classify { text } => tickets::classify(&desk, &cli::joined(&text)?).await,
        Commands::Ticket { text, category } => {
            tickets::open(&desk, &cli::joined(&text)?, category.as_deref()).await
        }
        Commands::Message { ticket_id, text } => {
            tickets::message(&desk, &ticket_id, &cli::joined(&text)?).await
        }
        Commands::Resolve { ticket_id, text } => {
            tickets::resolve(&desk, &ticket_id, &cli::joined(&text)?)
        }
        Commands::Feedback {
            ticket_id,
            rating,
            comment,
        } => tickets::feedback(&desk, &ticket_id, rating, comment.as_deref()),
        Commands::Health { ticket_id } => tickets::health(&desk, &ticket_id),
        Commands::Show { ticket_id } => tickets::show(&desk, &ticket_id),
        Commands::Stats => tickets::stats(&desk),
        Commands::Seed => Ok(()),
    }
}
